//! `runs list`: show recent seed runs.

use catseed_db::SeedRunRow;
use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum RunsCommands {
    /// List the most recent seed runs, newest first
    List {
        /// Maximum number of runs to show
        #[arg(long, default_value = "20")]
        limit: u32,
    },
}

/// Print the most recent `limit` seed runs.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_runs_list(pool: &sqlx::PgPool, limit: u32) -> anyhow::Result<()> {
    let runs = catseed_db::list_seed_runs(pool, i64::from(limit)).await?;

    if runs.is_empty() {
        println!("no seed runs recorded yet");
        return Ok(());
    }

    println!(
        "{:<7}{:<14}{:<11}{:<21}{:>8}  ERROR",
        "ID", "TYPE", "STATUS", "CREATED", "RECORDS"
    );
    for run in &runs {
        println!("{}", format_run(run));
    }
    Ok(())
}

fn format_run(run: &SeedRunRow) -> String {
    format!(
        "{:<7}{:<14}{:<11}{:<21}{:>8}  {}",
        run.id,
        run.run_type,
        run.status,
        run.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        run.records_processed,
        run.error_message.as_deref().unwrap_or("-"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_run_shows_error_or_dash() {
        let created_at = "2026-03-01T12:30:00Z"
            .parse::<chrono::DateTime<chrono::Utc>>()
            .unwrap();
        let mut run = SeedRunRow {
            id: 7,
            public_id: uuid::Uuid::new_v4(),
            run_type: "variants".to_string(),
            status: "succeeded".to_string(),
            started_at: None,
            completed_at: None,
            records_processed: 10,
            error_message: None,
            created_at,
        };
        let line = format_run(&run);
        assert!(line.starts_with("7      variants      succeeded  2026-03-01 12:30:00"));
        assert!(line.ends_with("10  -"));

        run.status = "failed".to_string();
        run.error_message = Some("model returned garbage".to_string());
        assert!(format_run(&run).ends_with("model returned garbage"));
    }
}
