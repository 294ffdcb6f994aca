//! Integration tests for the db.txt parser.

use regdb_keys::db::{Flags, FreqBand, PowerRestriction};
use regdb_keys::{DbError, DbParser};

const DB: &str = "\
# 2.4 GHz
band B24: 2402 - 2482 @ 40
power P24: N/A, 100 mW, N/A

country 00:
\tB24, P24
\t(57240 - 63720 @ 2160), (N/A, 0, N/A), NO-OUTDOOR

country JP:
\tB24, P24, NO-OFDM
";

#[test]
fn test_world_and_country_rules() {
    let mut parser = DbParser::new();
    let db = parser.parse_str(DB).expect("db parses");

    assert!(parser.warnings().is_empty());
    assert_eq!(db.len(), 2);

    let world = db.country("00").expect("world regdomain");
    assert_eq!(world.permissions().len(), 2);
    assert_eq!(world.permissions()[0].band, FreqBand::new(2402.0, 2482.0, 40.0));
    assert_eq!(world.permissions()[0].band.comments, vec!["2.4 GHz".to_string()]);
    assert_eq!(world.permissions()[1].band, FreqBand::new(57240.0, 63720.0, 2160.0));
    assert_eq!(world.permissions()[1].power, PowerRestriction::new(0.0, 0.0, 0.0));
    assert_eq!(world.permissions()[1].flags, Flags::NO_OUTDOOR);

    let jp = db.country("JP").expect("JP rules");
    assert!((jp.permissions()[0].power.max_ir - 20.0).abs() < 1e-9);
    assert_eq!(jp.permissions()[0].flags, Flags::NO_OFDM);
}

#[test]
fn test_error_reports_line() {
    let err = DbParser::new()
        .parse_str("band A: 1 - 2\n\nbogus\n")
        .unwrap_err();

    assert!(matches!(err, DbError::Syntax { line: 3, .. }));
    assert_eq!(
        err.to_string(),
        "Syntax error in line 3 (Expected band, power or country definition)"
    );
}
