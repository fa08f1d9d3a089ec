pub const CREATE_WARNINGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS warnings (
    sent INTEGER NOT NULL,
    nickname TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    dangertype TEXT NOT NULL,
    areacode TEXT,
    phonenumber TEXT,
    weather INTEGER,
    PRIMARY KEY (sent, nickname)
);
"#;

pub const INSERT_WARNING: &str = r#"
INSERT INTO warnings (sent, nickname, latitude, longitude, dangertype, areacode, phonenumber, weather)
VALUES (?, ?, ?, ?, ?, ?, ?, ?);
"#;

pub const ANY_WARNING: &str = r#"
SELECT EXISTS (SELECT 1 FROM warnings LIMIT 1);
"#;

pub const SELECT_ALL_WARNINGS: &str = r#"
SELECT sent, nickname, latitude, longitude, dangertype, areacode, phonenumber, weather
FROM warnings
ORDER BY rowid;
"#;

pub const SELECT_WARNINGS_BY_NICKNAME: &str = r#"
SELECT sent, nickname, latitude, longitude, dangertype, areacode, phonenumber, weather
FROM warnings
WHERE nickname = ?
ORDER BY rowid;
"#;

pub const SELECT_WARNINGS_BY_TIME_RANGE: &str = r#"
SELECT sent, nickname, latitude, longitude, dangertype, areacode, phonenumber, weather
FROM warnings
WHERE sent >= ? AND sent <= ?
ORDER BY rowid;
"#;
