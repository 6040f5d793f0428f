/*!
 * Database schema definitions and bootstrap.
 *
 * Tables are created one by one on connect, each only when it is missing
 * from `sqlite_master`. The `option` table additionally receives its single
 * seed row the moment it is created.
 */

use log::{debug, info};
use rusqlite::Connection;

use crate::providers::AiPlatform;

/// A table the application owns, with the batch that creates it
#[derive(Debug, Clone, Copy)]
pub struct TableDefinition {
    pub name: &'static str,
    pub create_sql: &'static str,
}

pub const LANGUAGE_TABLE: &str = "language";
pub const LESSON_TABLE: &str = "class";
pub const WORD_TABLE: &str = "word";
pub const OPTION_TABLE: &str = "option";
pub const AUDIO_CACHE_TABLE: &str = "wordBase64";

/// Id of the single settings row
pub const OPTION_ROW_ID: i64 = 1;

/// All tables, in bootstrap order
pub const TABLES: [TableDefinition; 5] = [
    TableDefinition {
        name: LANGUAGE_TABLE,
        create_sql: r#"
        CREATE TABLE IF NOT EXISTS language (
            id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
            title TEXT NOT NULL,
            languageText TEXT NOT NULL,
            voice TEXT NOT NULL,
            lastViewId INTEGER DEFAULT 0,
            createTime TEXT DEFAULT (datetime('now', 'localtime'))
        );
        "#,
    },
    TableDefinition {
        name: LESSON_TABLE,
        create_sql: r#"
        CREATE TABLE IF NOT EXISTS class (
            id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
            languageId INTEGER NOT NULL,
            isFinish INTEGER DEFAULT 0,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            translation TEXT,
            filePath TEXT NOT NULL,
            audioFileName TEXT NOT NULL,
            audioSrtJsonName TEXT NOT NULL,
            createTime TEXT DEFAULT (datetime('now', 'localtime'))
        );

        CREATE INDEX IF NOT EXISTS idx_class_language ON class (languageId);
        "#,
    },
    TableDefinition {
        name: WORD_TABLE,
        create_sql: r#"
        CREATE TABLE IF NOT EXISTS word (
            id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
            classId INTEGER NOT NULL,
            languageId INTEGER NOT NULL,
            inlineId INTEGER,
            content TEXT,
            oartOfSpeech TEXT,
            pronunciation TEXT,
            interpretation TEXT,
            other TEXT,
            applicable INTEGER DEFAULT 1,
            spell INTEGER DEFAULT 1,
            startIndex INTEGER NOT NULL,
            sort INTEGER NOT NULL DEFAULT 0,
            createTime TEXT DEFAULT (datetime('now', 'localtime'))
        );

        CREATE INDEX IF NOT EXISTS idx_word_language_applicable ON word (languageId, applicable);
        CREATE INDEX IF NOT EXISTS idx_word_class ON word (classId);
        "#,
    },
    TableDefinition {
        name: OPTION_TABLE,
        create_sql: r#"
        CREATE TABLE IF NOT EXISTS option (
            id INTEGER PRIMARY KEY NOT NULL,
            nowAiPlatform TEXT NOT NULL,
            ChatGLM TEXT,
            ChatGPT TEXT,
            DeepSeek TEXT,
            Google TEXT,
            Groq TEXT,
            annotationPrompt TEXT,
            translationPrompt TEXT,
            annotationRule INTEGER DEFAULT 0,
            annotationNumber INTEGER DEFAULT 10,
            showOartOfSpeech INTEGER DEFAULT 1,
            playSpeed REAL DEFAULT 1.0
        );
        "#,
    },
    TableDefinition {
        name: AUDIO_CACHE_TABLE,
        create_sql: r#"
        CREATE TABLE IF NOT EXISTS wordBase64 (
            id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
            classId INTEGER NOT NULL,
            word TEXT NOT NULL UNIQUE,
            base64 TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_word_base64_word ON wordBase64 (word);
        "#,
    },
];

/// Create every missing table and return the names of the ones created.
///
/// Stops at the first failing table; tables created before it stay.
pub fn bootstrap(conn: &Connection) -> rusqlite::Result<Vec<&'static str>> {
    let mut created = Vec::new();

    for table in TABLES.iter() {
        if table_exists(conn, table.name)? {
            debug!("Table '{}' already present", table.name);
            continue;
        }

        info!("Creating table '{}'", table.name);
        conn.execute_batch(table.create_sql)?;

        if table.name == OPTION_TABLE {
            seed_options(conn)?;
        }

        created.push(table.name);
    }

    Ok(created)
}

/// Check whether a table exists in the catalog
pub fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn seed_options(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO option (id, nowAiPlatform) VALUES (?1, ?2)",
        rusqlite::params![OPTION_ROW_ID, AiPlatform::default().to_string()],
    )?;
    Ok(())
}
