//! Standard catalog lengths, shortest first.

use super::entities::{LengthEntry, ParseError};

pub static LENGTH_CATALOG: &[LengthEntry] = &[
    LengthEntry::new(0.2, "0.2 m / 7 in"),
    LengthEntry::new(0.3, "0.3 m / 1 ft"),
    LengthEntry::new(0.5, "0.5 m / 1.64 ft"),
    LengthEntry::new(0.6, "0.6 m / 2 ft"),
    LengthEntry::new(0.91, "0.91 m / 3 ft"),
    LengthEntry::new(1.0, "1 m / 3.28 ft"),
    LengthEntry::new(1.21, "1.21 m / 4 ft"),
    LengthEntry::new(1.5, "1.5 m / 4.92 ft"),
    LengthEntry::new(1.52, "1.52 m / 5 ft"),
    LengthEntry::new(1.82, "1.82 m / 6 ft"),
    LengthEntry::new(2.0, "2 m / 6.56 ft"),
    LengthEntry::new(2.12, "2.12 m / 7 ft"),
    LengthEntry::new(2.43, "2.43 m / 8 ft"),
    LengthEntry::new(2.5, "2.5 m / 8.20 ft"),
    LengthEntry::new(2.74, "2.74 m / 9 ft"),
    LengthEntry::new(3.0, "3 m / 9.84 ft"),
    LengthEntry::new(3.05, "3.05 m / 10 ft"),
    LengthEntry::new(3.5, "3.5 m / 11.48 ft"),
    LengthEntry::new(3.65, "3.65 m / 12 ft"),
    LengthEntry::new(4.0, "4 m / 13.12 ft"),
    LengthEntry::new(4.26, "4.26 m / 14 ft"),
    LengthEntry::new(4.57, "4.57 m / 15 ft"),
    LengthEntry::new(4.87, "4.87 m / 16 ft"),
    LengthEntry::new(5.0, "5 m / 16.40 ft"),
    LengthEntry::new(5.48, "5.48 m / 18 ft"),
    LengthEntry::new(6.0, "6 m / 19.68 ft"),
    LengthEntry::new(6.09, "6.09 m / 20 ft"),
    LengthEntry::new(7.0, "7 m / 22.96 ft"),
    LengthEntry::new(7.62, "7.62 m / 25 ft"),
    LengthEntry::new(8.0, "8 m / 26.24 ft"),
    LengthEntry::new(9.0, "9 m / 29.52 ft"),
    LengthEntry::new(9.14, "9.14 m / 30 ft"),
    LengthEntry::new(10.0, "10 m / 32.80 ft"),
    LengthEntry::new(12.0, "12 m / 39.37 ft"),
    LengthEntry::new(12.19, "12.19 m / 40 ft"),
    LengthEntry::new(15.0, "15 m / 49.21 ft"),
    LengthEntry::new(15.24, "15.24 m / 50 ft"),
    LengthEntry::new(17.0, "17 m / 55.77 ft"),
    LengthEntry::new(18.28, "18.28 m / 60 ft"),
    LengthEntry::new(20.0, "20 m / 65.61 ft"),
    LengthEntry::new(21.33, "21.33 m / 70 ft"),
    LengthEntry::new(22.0, "22 m / 72.17 ft"),
    LengthEntry::new(22.86, "22.86 m / 75 ft"),
    LengthEntry::new(24.38, "24.38 m / 80 ft"),
    LengthEntry::new(25.0, "25 m / 82.02 ft"),
    LengthEntry::new(27.43, "27.43 m / 90 ft"),
    LengthEntry::new(30.0, "30 m / 98.42 ft"),
    LengthEntry::new(30.48, "30.48 m / 100 ft"),
    LengthEntry::new(33.52, "33.52 m / 110 ft"),
    LengthEntry::new(35.0, "35 m / 114.82 ft"),
    LengthEntry::new(36.57, "36.57 m / 120 ft"),
    LengthEntry::new(38.1, "38.1 m / 125 ft"),
    LengthEntry::new(39.62, "39.62 m / 130 ft"),
    LengthEntry::new(40.0, "40 m / 131.23 ft"),
    LengthEntry::new(42.67, "42.67 m / 140 ft"),
    LengthEntry::new(45.72, "45.72 m / 150 ft"),
    LengthEntry::new(48.76, "48.76 m / 160 ft"),
    LengthEntry::new(50.0, "50 m / 164.04 ft"),
    LengthEntry::new(53.34, "53.34 m / 175 ft"),
    LengthEntry::new(54.86, "54.86 m / 180 ft"),
    LengthEntry::new(55.0, "55 m / 180.44 ft"),
    LengthEntry::new(60.96, "60.96 m / 200 ft"),
    LengthEntry::new(65.0, "65 m / 213.25 ft"),
    LengthEntry::new(67.05, "67.05 m / 220 ft"),
    LengthEntry::new(68.58, "68.58 m / 225 ft"),
    LengthEntry::new(70.0, "70 m / 229.65 ft"),
    LengthEntry::new(73.15, "73.15 m / 240 ft"),
    LengthEntry::new(76.2, "76.20 m / 250 ft"),
    LengthEntry::new(79.24, "79.24 m / 260 ft"),
    LengthEntry::new(80.0, "80 m / 262.46 ft"),
    LengthEntry::new(83.82, "83.82 m / 275 ft"),
    LengthEntry::new(85.34, "85.34 m / 280 ft"),
    LengthEntry::new(90.0, "90 m / 295.27 ft"),
    LengthEntry::new(91.44, "91.44 m / 300 ft"),
    LengthEntry::new(95.0, "95 m / 311.67 ft"),
    LengthEntry::new(99.06, "99.06 m / 325 ft"),
    LengthEntry::new(100.0, "100 m / 328.08 ft"),
    LengthEntry::new(106.68, "106.68 m / 350 ft"),
    LengthEntry::new(114.3, "114.3 m / 375 ft"),
    LengthEntry::new(121.92, "121.92 m / 400 ft"),
    LengthEntry::new(125.0, "125 m / 410.10 ft"),
    LengthEntry::new(129.54, "129.54 m / 425 ft"),
    LengthEntry::new(137.16, "137.16 m / 450 ft"),
    LengthEntry::new(144.78, "144.78 m / 475 ft"),
    LengthEntry::new(150.0, "150 m / 492.12 ft"),
    LengthEntry::new(152.4, "152.40 m / 500 ft"),
    LengthEntry::new(160.02, "160.02 m / 525 ft"),
    LengthEntry::new(167.64, "167.64 m / 550 ft"),
    LengthEntry::new(175.0, "175 m / 574.14 ft"),
    LengthEntry::new(182.88, "182.88 m / 600 ft"),
    LengthEntry::new(200.0, "200 m / 656.16 ft"),
    LengthEntry::new(250.0, "250 m / 820.20 ft"),
    LengthEntry::new(300.0, "300 m / 984.25 ft"),
    LengthEntry::new(304.8, "304.8 m / 1000 ft"),
    LengthEntry::new(350.0, "350 m / 1148.29 ft"),
    LengthEntry::new(400.0, "400 m / 1312.33 ft"),
    LengthEntry::new(500.0, "500 m / 1640.41 ft"),
    LengthEntry::new(550.0, "550 m / 1804.46 ft"),
    LengthEntry::new(1000.0, "1000 m / 3280.83 ft"),
    LengthEntry::new(2000.0, "2000 m / 6561.66 ft"),
];

/// Parses a pasted list of lengths in meters, one per line or comma separated.
pub fn parse_lengths(input: &str) -> Result<Vec<LengthEntry>, ParseError> {
    input
        .split(|ch| ch == '\n' || ch == ',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .trim_end_matches('m')
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|meters| meters.is_finite() && *meters > 0.0)
                .map(LengthEntry::custom)
                .ok_or_else(|| ParseError::InvalidLength(token.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_strictly_ascending() {
        assert!(LENGTH_CATALOG
            .windows(2)
            .all(|pair| pair[0].meters < pair[1].meters));
        assert_eq!(LENGTH_CATALOG.first().map(|e| e.meters), Some(0.2));
        assert_eq!(LENGTH_CATALOG.last().map(|e| e.meters), Some(2000.0));
    }

    #[test]
    fn parses_mixed_separators() {
        let entries = parse_lengths("1.21, 3\n\n 10m ,").unwrap();
        let meters: Vec<f64> = entries.iter().map(|e| e.meters).collect();
        assert_eq!(meters, vec![1.21, 3.0, 10.0]);
        assert_eq!(entries[1].label, "3 m / 9.84 ft");
    }

    #[test]
    fn rejects_bad_tokens() {
        assert_eq!(
            parse_lengths("1, abc").unwrap_err(),
            ParseError::InvalidLength("abc".to_string())
        );
        assert!(parse_lengths("-2").is_err());
        assert!(parse_lengths("").unwrap().is_empty());
    }
}
