use rusqlite::{params, Connection, Result};
use std::path::Path;

use crate::detect::BurstReport;

/// Summary row of one stored detection run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub id: i64,
    pub source: String,
    pub created: String,
    pub sample_rate: u32,
    pub n_bursts: usize,
}

/// Burst row as stored; band powers are not persisted, only the per-event
/// measures that are meaningful across runs.
#[derive(Debug, Clone)]
pub struct StoredBurst {
    pub time_sec: f64,
    pub freq_hz: f64,
    pub power: f64,
    pub duration_ms: Option<f64>,
    pub spectral_width_hz: Option<f64>,
}

/// SQLite store of detection runs, kept under the project data directory so
/// repeated analyses of a recording can be compared later.
pub struct RunDatabase {
    conn: Connection,
}

impl RunDatabase {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source TEXT NOT NULL,
                created TEXT NOT NULL DEFAULT (datetime('now')),
                sample_rate INTEGER NOT NULL,
                n_bursts INTEGER NOT NULL
            )",
            [],
        )?;
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS bursts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id INTEGER NOT NULL REFERENCES runs(id) ON DELETE CASCADE,
                time_index INTEGER NOT NULL,
                time_sec REAL NOT NULL,
                freq_hz REAL NOT NULL,
                power REAL NOT NULL,
                start_sec REAL,
                end_sec REAL,
                duration_ms REAL,
                lower_freq_hz REAL,
                upper_freq_hz REAL,
                spectral_width_hz REAL
            )",
            [],
        )?;
        Ok(())
    }

    pub fn record_run(&self, source: &str, sample_rate: u32, report: &BurstReport) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO runs (source, sample_rate, n_bursts) VALUES (?1, ?2, ?3)",
            params![source, sample_rate, report.bursts.len() as i64],
        )?;
        let run_id = self.conn.last_insert_rowid();
        for b in &report.bursts {
            self.conn.execute(
                "INSERT INTO bursts (run_id, time_index, time_sec, freq_hz, power,
                     start_sec, end_sec, duration_ms, lower_freq_hz, upper_freq_hz, spectral_width_hz)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    run_id,
                    b.time_index as i64,
                    b.time_sec,
                    b.freq_hz,
                    b.power,
                    b.start_sec,
                    b.end_sec,
                    b.duration_ms,
                    b.lower_freq_hz,
                    b.upper_freq_hz,
                    b.spectral_width_hz
                ],
            )?;
        }
        Ok(run_id)
    }

    pub fn list_runs(&self) -> Result<Vec<RunSummary>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, source, created, sample_rate, n_bursts FROM runs ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(RunSummary {
                id: row.get(0)?,
                source: row.get(1)?,
                created: row.get(2)?,
                sample_rate: row.get(3)?,
                n_bursts: row.get::<_, i64>(4)? as usize,
            })
        })?;
        rows.collect()
    }

    pub fn run_bursts(&self, run_id: i64) -> Result<Vec<StoredBurst>> {
        let mut stmt = self.conn.prepare(
            "SELECT time_sec, freq_hz, power, duration_ms, spectral_width_hz
             FROM bursts WHERE run_id = ?1 ORDER BY time_index",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok(StoredBurst {
                time_sec: row.get(0)?,
                freq_hz: row.get(1)?,
                power: row.get(2)?,
                duration_ms: row.get(3)?,
                spectral_width_hz: row.get(4)?,
            })
        })?;
        rows.collect()
    }

    pub fn remove_run(&self, run_id: i64) -> Result<()> {
        self.conn.execute("DELETE FROM bursts WHERE run_id = ?1", params![run_id])?;
        self.conn.execute("DELETE FROM runs WHERE id = ?1", params![run_id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::Burst;
    use crate::surface::PowerSurface;

    fn in_memory() -> RunDatabase {
        let conn = Connection::open_in_memory().unwrap();
        let db = RunDatabase { conn };
        db.init().unwrap();
        db
    }

    fn report_with_one_burst() -> BurstReport {
        let mut power = vec![vec![0.0; 2000]; 2];
        power[1][1500] = 12.0;
        let surface = PowerSurface::new(power, vec![18.0, 22.0], 1000).unwrap();
        let mut burst = Burst::at_peak(1, 1500, &surface);
        burst.duration_ms = Some(120.0);
        BurstReport { thresholds: vec![0.5, 0.5], bursts: vec![burst] }
    }

    #[test]
    fn test_record_and_list() {
        let db = in_memory();
        let report = report_with_one_burst();
        let run_id = db.record_run("rest.wav", 1000, &report).unwrap();
        let runs = db.list_runs().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].id, run_id);
        assert_eq!(runs[0].source, "rest.wav");
        assert_eq!(runs[0].n_bursts, 1);

        let bursts = db.run_bursts(run_id).unwrap();
        assert_eq!(bursts.len(), 1);
        assert_eq!(bursts[0].freq_hz, 22.0);
        assert_eq!(bursts[0].duration_ms, Some(120.0));
        assert_eq!(bursts[0].spectral_width_hz, None, "NULL maps back to None");
    }

    #[test]
    fn test_remove_run() {
        let db = in_memory();
        let report = report_with_one_burst();
        let run_id = db.record_run("rest.wav", 1000, &report).unwrap();
        db.remove_run(run_id).unwrap();
        assert!(db.list_runs().unwrap().is_empty());
        assert!(db.run_bursts(run_id).unwrap().is_empty());
    }
}
