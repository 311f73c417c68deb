//! SQLite persistence for staffing plans.
//!
//! RULE: Only store.rs talks to the database.
//! The optimizer never touches the store; the runner persists batch output.

use crate::{
    batch::StaffingRow,
    config::OperationalTargets,
    error::PlanResult,
    optimizer::{OptimizationResult, TargetMetrics},
};
use chrono::NaiveDateTime;
use rusqlite::{params, types::Type, Connection, Row};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub struct PlanStore {
    conn: Connection,
}

impl PlanStore {
    /// Open (or create) the plan database at `path`.
    pub fn open(path: &str) -> PlanResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only sticks for real files.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> PlanResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> PlanResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_plan.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(
        &self,
        run_id: &str,
        targets: &OperationalTargets,
        version: &str,
    ) -> PlanResult<()> {
        self.conn.execute(
            "INSERT INTO plan_run (run_id, method, targets_json, version, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                run_id,
                targets.method.as_str(),
                serde_json::to_string(targets)?,
                version,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn run_targets(&self, run_id: &str) -> PlanResult<OperationalTargets> {
        let json: String = self.conn.query_row(
            "SELECT targets_json FROM plan_run WHERE run_id = ?1",
            params![run_id],
            |r| r.get(0),
        )?;
        Ok(serde_json::from_str(&json)?)
    }

    // ── Staffing intervals ─────────────────────────────────────

    pub fn insert_staffing_row(&self, run_id: &str, row: &StaffingRow) -> PlanResult<()> {
        insert_staffing_row(&self.conn, run_id, row)
    }

    /// Persist a whole plan in one transaction.
    pub fn insert_plan(&mut self, run_id: &str, rows: &[StaffingRow]) -> PlanResult<()> {
        let tx = self.conn.transaction()?;
        for row in rows {
            insert_staffing_row(&tx, run_id, row)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn staffing_rows(&self, run_id: &str) -> PlanResult<Vec<StaffingRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT interval_start, interval_end, exp_vol, exp_aht, traffic_intensity,
                    agent_req, agent_req_shrink, pred_occupancy, prob_waiting,
                    pred_sla, pred_st, pred_asa, numeric_fallback
             FROM staffing_interval WHERE run_id = ?1
             ORDER BY interval_start ASC, id ASC",
        )?;
        let rows = stmt
            .query_map(params![run_id], staffing_row_from_sql)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn staffing_row_count(&self, run_id: &str) -> PlanResult<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM staffing_interval WHERE run_id = ?1",
            params![run_id],
            |r| r.get(0),
        )?)
    }
}

fn insert_staffing_row(conn: &Connection, run_id: &str, row: &StaffingRow) -> PlanResult<()> {
    let r = &row.result;
    let (pred_sla, pred_st, pred_asa) = match r.metrics {
        TargetMetrics::Sla { pred_sla, pred_st } => (Some(pred_sla), Some(pred_st), None),
        TargetMetrics::Asa { pred_asa } => (None, None, Some(pred_asa)),
    };
    conn.execute(
        "INSERT INTO staffing_interval (
            run_id, interval_start, interval_end, exp_vol, exp_aht,
            traffic_intensity, agent_req, agent_req_shrink, pred_occupancy,
            prob_waiting, pred_sla, pred_st, pred_asa, numeric_fallback
        ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14)",
        params![
            run_id,
            row.interval_start.format(TIMESTAMP_FORMAT).to_string(),
            row.interval_end.format(TIMESTAMP_FORMAT).to_string(),
            row.exp_vol,
            row.exp_aht,
            r.traffic_intensity,
            r.agent_req as i64,
            r.agent_req_shrink as i64,
            r.pred_occupancy,
            r.prob_waiting,
            pred_sla,
            pred_st,
            pred_asa,
            r.numeric_fallback,
        ],
    )?;
    Ok(())
}

fn staffing_row_from_sql(row: &Row<'_>) -> rusqlite::Result<StaffingRow> {
    let pred_sla: Option<f64> = row.get(9)?;
    let pred_st: Option<f64> = row.get(10)?;
    let pred_asa: Option<f64> = row.get(11)?;
    let metrics = match (pred_sla, pred_st, pred_asa) {
        (Some(pred_sla), Some(pred_st), _) => TargetMetrics::Sla { pred_sla, pred_st },
        (_, _, Some(pred_asa)) => TargetMetrics::Asa { pred_asa },
        _ => {
            return Err(rusqlite::Error::InvalidColumnType(
                11,
                "pred_asa".to_string(),
                Type::Null,
            ))
        }
    };

    Ok(StaffingRow {
        interval_start: parse_timestamp(row, 0)?,
        interval_end:   parse_timestamp(row, 1)?,
        exp_vol:        row.get(2)?,
        exp_aht:        row.get(3)?,
        result: OptimizationResult {
            traffic_intensity: row.get(4)?,
            agent_req:         row.get::<_, i64>(5)? as u64,
            agent_req_shrink:  row.get::<_, i64>(6)? as u64,
            pred_occupancy:    row.get(7)?,
            prob_waiting:      row.get(8)?,
            metrics,
            numeric_fallback:  row.get(12)?,
        },
    })
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let text: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
