use anyhow::Result;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::report::{ElementStatus, WaterType};
use crate::store;

pub fn run(args: StatusArgs) -> Result<()> {
    let db_path = args.resolved_db_path();
    info!(cache_root = %args.cache_root.display(), "status requested");

    if !db_path.exists() {
        warn!(path = %db_path.display(), "test database missing; run ingest first");
        return Ok(());
    }

    let connection = store::open_read_only(&db_path)?;
    let total = store::count_tests(&connection)?;
    info!(path = %db_path.display(), tests_total = total, "loaded test database");

    for water_type in [WaterType::Saltwater, WaterType::RoWater] {
        let Some(latest) = store::latest_by_water_type(&connection, water_type)? else {
            info!(water_type = %water_type, "no stored tests");
            continue;
        };

        info!(
            water_type = %water_type,
            id = latest.id,
            test_date = %latest.test_date,
            test_id = %latest.test_id.as_deref().unwrap_or("-"),
            score_overall = ?latest.score_overall,
            pdf = %latest.pdf_filename.as_deref().unwrap_or("-"),
            "latest test"
        );

        for (element, value, status) in store::element_readings(&connection, latest.id)? {
            let Some(status) = status.filter(|status| *status != ElementStatus::Normal) else {
                continue;
            };
            info!(
                water_type = %water_type,
                element = element.code(),
                group = element.group().as_str(),
                value = ?value,
                unit = element.unit(),
                status = status.as_str(),
                "out-of-range reading"
            );
        }
    }

    Ok(())
}
