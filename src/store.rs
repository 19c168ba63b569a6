use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params, params_from_iter};
use serde::Serialize;

use crate::report::{Element, ElementStatus, ParsedRecord, ScoreCategory, WaterType};
use crate::util::now_utc_string;

pub const DEFAULT_DB_FILE: &str = "icp_tests.sqlite";
pub const DB_SCHEMA_VERSION: &str = "0.1.0";

/// Where a stored document came from.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub filename: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredTest {
    pub id: i64,
    pub test_date: String,
    pub test_id: Option<String>,
    pub water_type: String,
    pub score_overall: Option<i64>,
    pub pdf_filename: Option<String>,
}

pub fn open(path: &Path) -> Result<Connection> {
    let connection =
        Connection::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;
    Ok(connection)
}

/// Opens an existing database for reading; the schema is left untouched.
pub fn open_read_only(path: &Path) -> Result<Connection> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("failed to open database read-only: {}", path.display()))
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

/// Element codes are quoted in SQL since `as` is a keyword.
pub fn ensure_schema(connection: &Connection) -> Result<()> {
    let score_columns = ScoreCategory::ALL
        .iter()
        .map(|category| format!("  {} INTEGER,\n", category.column()))
        .collect::<String>();
    let element_columns = Element::ALL
        .iter()
        .map(|element| format!("  \"{code}\" REAL,\n  {code}_status TEXT,\n", code = element.code()))
        .collect::<String>();

    connection
        .execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS metadata (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS icp_tests (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              test_date TEXT NOT NULL,
              lab_name TEXT NOT NULL,
              test_id TEXT,
              sample_date TEXT,
              received_date TEXT,
              evaluated_date TEXT,
              water_type TEXT NOT NULL,
            {score_columns}{element_columns}  recommendations TEXT,
              dosing_instructions TEXT,
              pdf_filename TEXT,
              pdf_sha256 TEXT,
              created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS ix_icp_tests_test_date ON icp_tests(test_date);
            CREATE INDEX IF NOT EXISTS ix_icp_tests_lab_name ON icp_tests(lab_name);
            CREATE INDEX IF NOT EXISTS ix_icp_tests_pdf_sha256 ON icp_tests(pdf_sha256);
            "
        ))
        .context("failed to create icp_tests schema")?;

    connection
        .execute(
            "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![DB_SCHEMA_VERSION],
        )
        .context("failed to record schema version")?;

    Ok(())
}

pub fn is_document_stored(connection: &Connection, sha256: &str) -> Result<bool> {
    let found = connection
        .query_row(
            "SELECT 1 FROM icp_tests WHERE pdf_sha256 = ?1 LIMIT 1",
            params![sha256],
            |_| Ok(()),
        )
        .optional()
        .context("failed to look up stored document")?;
    Ok(found.is_some())
}

/// Stores every record of one document, or none of them.
pub fn insert_document(
    connection: &mut Connection,
    records: &[ParsedRecord],
    source: &SourceDocument,
) -> Result<usize> {
    let columns = insert_columns();
    let placeholders = (1..=columns.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<String>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO icp_tests ({}) VALUES ({})",
        columns.join(", "),
        placeholders
    );

    let created_at = now_utc_string();
    let transaction = connection
        .transaction()
        .context("failed to begin icp_tests transaction")?;
    {
        let mut statement = transaction
            .prepare(&sql)
            .context("failed to prepare icp_tests insert")?;
        for record in records {
            let values = record_values(record, source, &created_at)?;
            statement
                .execute(params_from_iter(values.iter()))
                .with_context(|| {
                    format!(
                        "failed to insert {} record for {}",
                        record.water_type, source.filename
                    )
                })?;
        }
    }
    transaction
        .commit()
        .context("failed to commit icp_tests transaction")?;

    Ok(records.len())
}

pub fn count_tests(connection: &Connection) -> Result<i64> {
    let count = connection
        .query_row("SELECT COUNT(*) FROM icp_tests", [], |row| row.get(0))
        .context("failed to count icp_tests")?;
    Ok(count)
}

pub fn latest_by_water_type(
    connection: &Connection,
    water_type: WaterType,
) -> Result<Option<StoredTest>> {
    connection
        .query_row(
            "
            SELECT id, test_date, test_id, water_type, score_overall, pdf_filename
            FROM icp_tests
            WHERE water_type = ?1
            ORDER BY test_date DESC, id DESC
            LIMIT 1
            ",
            params![water_type.as_str()],
            |row| {
                Ok(StoredTest {
                    id: row.get(0)?,
                    test_date: row.get(1)?,
                    test_id: row.get(2)?,
                    water_type: row.get(3)?,
                    score_overall: row.get(4)?,
                    pdf_filename: row.get(5)?,
                })
            },
        )
        .optional()
        .with_context(|| format!("failed to load latest {water_type} test"))
}

/// Element readings of one stored test, in vocabulary order.
pub fn element_readings(
    connection: &Connection,
    id: i64,
) -> Result<Vec<(Element, Option<f64>, Option<ElementStatus>)>> {
    let columns = Element::ALL
        .iter()
        .map(|element| format!("\"{code}\", {code}_status", code = element.code()))
        .collect::<Vec<String>>()
        .join(", ");
    let sql = format!("SELECT {columns} FROM icp_tests WHERE id = ?1");

    connection
        .query_row(&sql, params![id], |row| {
            Element::ALL
                .iter()
                .enumerate()
                .map(|(index, element)| {
                    let status = row
                        .get::<_, Option<String>>(index * 2 + 1)?
                        .as_deref()
                        .and_then(ElementStatus::from_tag);
                    Ok((*element, row.get(index * 2)?, status))
                })
                .collect::<rusqlite::Result<Vec<_>>>()
        })
        .with_context(|| format!("failed to load element readings for test {id}"))
}

fn insert_columns() -> Vec<String> {
    let mut columns = [
        "test_date",
        "lab_name",
        "test_id",
        "sample_date",
        "received_date",
        "evaluated_date",
        "water_type",
    ]
    .iter()
    .map(|column| column.to_string())
    .collect::<Vec<String>>();

    columns.extend(
        ScoreCategory::ALL
            .iter()
            .map(|category| category.column().to_string()),
    );
    for element in Element::ALL {
        columns.push(format!("\"{}\"", element.code()));
        columns.push(format!("{}_status", element.code()));
    }
    columns.extend(
        [
            "recommendations",
            "dosing_instructions",
            "pdf_filename",
            "pdf_sha256",
            "created_at",
        ]
        .iter()
        .map(|column| column.to_string()),
    );

    columns
}

fn record_values(
    record: &ParsedRecord,
    source: &SourceDocument,
    created_at: &str,
) -> Result<Vec<Value>> {
    let text = |value: Option<String>| value.map(Value::Text).unwrap_or(Value::Null);
    let date = |value: Option<chrono::NaiveDate>| text(value.map(|date| date.to_string()));

    let mut values = vec![
        Value::Text(record.test_date.to_string()),
        Value::Text(record.lab_name.clone()),
        text(record.test_id.clone()),
        date(record.sample_date),
        date(record.received_date),
        date(record.evaluated_date),
        Value::Text(record.water_type.as_str().to_string()),
    ];

    for category in ScoreCategory::ALL {
        values.push(
            record
                .scores
                .get(&category)
                .map(|score| Value::Integer(i64::from(*score)))
                .unwrap_or(Value::Null),
        );
    }

    for element in Element::ALL {
        values.push(
            record
                .elements
                .get(&element)
                .map(|value| Value::Real(*value))
                .unwrap_or(Value::Null),
        );
        values.push(text(
            record
                .statuses
                .get(&element)
                .map(|status| status.as_str().to_string()),
        ));
    }

    values.push(text(json_lines(record.recommendations.as_deref())?));
    values.push(text(json_lines(record.dosing_instructions.as_deref())?));
    values.push(Value::Text(source.filename.clone()));
    values.push(Value::Text(source.sha256.clone()));
    values.push(Value::Text(created_at.to_string()));

    Ok(values)
}

fn json_lines(lines: Option<&[String]>) -> Result<Option<String>> {
    lines
        .map(|lines| serde_json::to_string(lines).context("failed to serialize text block"))
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::*;

    fn memory_store() -> Connection {
        let connection = Connection::open_in_memory().expect("in-memory database opens");
        ensure_schema(&connection).expect("schema applies");
        connection
    }

    fn record(water_type: WaterType, day: u32, calcium: f64) -> ParsedRecord {
        let mut elements = BTreeMap::new();
        elements.insert(Element::Ca, calcium);
        elements.insert(Element::No3, 2.5);
        let mut statuses = BTreeMap::new();
        statuses.insert(Element::Ca, ElementStatus::Normal);
        statuses.insert(Element::Pb, ElementStatus::CriticallyHigh);
        let mut scores = BTreeMap::new();
        scores.insert(ScoreCategory::Overall, 84);

        ParsedRecord {
            lab_name: "ATI Aquaristik".to_string(),
            test_id: Some("123456789".to_string()),
            sample_date: None,
            received_date: None,
            evaluated_date: NaiveDate::from_ymd_opt(2024, 1, day),
            test_date: NaiveDate::from_ymd_opt(2024, 1, day).expect("valid date"),
            water_type,
            scores,
            elements,
            statuses,
            recommendations: Some(vec!["Raise KH".to_string()]),
            dosing_instructions: None,
        }
    }

    fn source(sha256: &str) -> SourceDocument {
        SourceDocument {
            filename: "2024-01-15_ati.pdf".to_string(),
            sha256: sha256.to_string(),
        }
    }

    #[test]
    fn ensure_schema_is_idempotent_and_has_every_vocabulary_column() {
        let connection = memory_store();
        ensure_schema(&connection).expect("schema re-applies");

        let mut statement = connection
            .prepare("SELECT name FROM pragma_table_info('icp_tests')")
            .expect("table info query");
        let names = statement
            .query_map([], |row| row.get::<_, String>(0))
            .expect("table info rows")
            .collect::<rusqlite::Result<Vec<String>>>()
            .expect("column names");

        for element in Element::ALL {
            assert!(names.iter().any(|name| name == element.code()));
            assert!(names.contains(&format!("{}_status", element.code())));
        }
        assert!(names.contains(&"score_base_elements".to_string()));
    }

    #[test]
    fn insert_document_stores_one_row_per_record() {
        let mut connection = memory_store();
        let records = vec![
            record(WaterType::Saltwater, 15, 420.0),
            record(WaterType::RoWater, 15, 0.5),
        ];

        let inserted = insert_document(&mut connection, &records, &source("abc"))
            .expect("document inserts");

        assert_eq!(inserted, 2);
        assert_eq!(count_tests(&connection).expect("count"), 2);
        assert!(is_document_stored(&connection, "abc").expect("lookup"));
        assert!(!is_document_stored(&connection, "def").expect("lookup"));

        let (calcium, status, recommendations): (f64, String, String) = connection
            .query_row(
                "SELECT ca, pb_status, recommendations FROM icp_tests WHERE water_type = 'saltwater'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .expect("stored row");
        assert_eq!(calcium, 420.0);
        assert_eq!(status, "CRITICALLY_HIGH");
        assert_eq!(recommendations, r#"["Raise KH"]"#);
    }

    #[test]
    fn latest_by_water_type_orders_by_test_date() {
        let mut connection = memory_store();
        insert_document(&mut connection, &[record(WaterType::Saltwater, 20, 430.0)], &source("new"))
            .expect("newer inserts");
        insert_document(&mut connection, &[record(WaterType::Saltwater, 10, 410.0)], &source("old"))
            .expect("older inserts");

        let latest = latest_by_water_type(&connection, WaterType::Saltwater)
            .expect("query runs")
            .expect("saltwater test exists");
        assert_eq!(latest.test_date, "2024-01-20");
        assert_eq!(latest.score_overall, Some(84));
        assert!(
            latest_by_water_type(&connection, WaterType::RoWater)
                .expect("query runs")
                .is_none()
        );

        let readings = element_readings(&connection, latest.id).expect("readings load");
        assert_eq!(readings.len(), Element::ALL.len());
        let calcium = readings
            .iter()
            .find(|(element, _, _)| *element == Element::Ca)
            .expect("calcium reading");
        assert_eq!(calcium.1, Some(430.0));
        assert_eq!(calcium.2, Some(ElementStatus::Normal));
    }

    #[test]
    fn open_read_only_reads_without_touching_the_schema() {
        let path = std::env::temp_dir().join(format!(
            "icp-report-read-only-{}.sqlite",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        {
            let mut connection = Connection::open(&path).expect("database file opens");
            ensure_schema(&connection).expect("schema applies");
            insert_document(&mut connection, &[record(WaterType::RoWater, 5, 0.4)], &source("ro"))
                .expect("record inserts");
            connection
                .execute(
                    "UPDATE metadata SET value = 'older' WHERE key = 'db_schema_version'",
                    [],
                )
                .expect("version rewritten");
        }

        let connection = open_read_only(&path).expect("read-only open");
        assert_eq!(count_tests(&connection).expect("count"), 1);
        let version: String = connection
            .query_row(
                "SELECT value FROM metadata WHERE key = 'db_schema_version'",
                [],
                |row| row.get(0),
            )
            .expect("version row");
        assert_eq!(version, "older");
        assert!(
            connection
                .execute("DELETE FROM icp_tests", [])
                .is_err()
        );

        drop(connection);
        let _ = std::fs::remove_file(&path);
    }
}
