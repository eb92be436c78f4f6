//! Console tables for a finished pipeline run.

use crate::pipeline::PipelineReport;
use crate::stats::BirthYearAverage;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}

pub fn oldest_table(report: &PipelineReport) -> Table {
    let mut table = new_table(vec![
        "histid", "byear", "bmonth", "dyear", "dmonth", "death_age", "weight",
    ]);
    for r in &report.oldest {
        table.add_row(vec![
            r.histid.clone(),
            r.birth_year.to_string(),
            r.birth_month.to_string(),
            r.death_year.to_string(),
            r.death_month.to_string(),
            r.death_age.to_string(),
            format!("{:.3}", r.weight),
        ]);
    }
    table
}

pub fn birth_year_table(title: &str, rows: &[BirthYearAverage]) -> Table {
    let mut table = new_table(vec![title, "avg death age", "records"]);
    for g in rows {
        table.add_row(vec![
            g.birth_year.to_string(),
            format!("{:.3}", g.avg_death_age),
            g.records.to_string(),
        ]);
    }
    table
}

pub fn death_month_table(report: &PipelineReport) -> Table {
    let mut table = new_table(vec!["death month", "deaths"]);
    for m in &report.top_death_months {
        table.add_row(vec![m.death_month.to_string(), m.deaths.to_string()]);
    }
    table
}

pub fn summary_table(report: &PipelineReport) -> Table {
    let s = &report.age_summary;
    let mut table = new_table(vec!["N", "Mean", "Median", "Std", "P05", "P95", "Min", "Max"]);
    table.add_row(vec![
        s.count.to_string(),
        format!("{:.3}", s.mean),
        format!("{:.3}", s.median),
        format!("{:.3}", s.std),
        format!("{:.3}", s.p05),
        format!("{:.3}", s.p95),
        format!("{:.0}", s.min),
        format!("{:.0}", s.max),
    ]);
    table
}

/// First and last rows of the date series; long series are elided.
pub fn date_series_table(report: &PipelineReport, edge_rows: usize) -> Table {
    let mut table = new_table(vec!["death_date", "total", "avg_age", "season"]);
    let series = &report.date_series;
    let elide = series.len() > edge_rows * 2;

    for (idx, d) in series.iter().enumerate() {
        if elide && idx >= edge_rows && idx < series.len() - edge_rows {
            if idx == edge_rows {
                table.add_row(vec!["…", "…", "…", "…"]);
            }
            continue;
        }
        table.add_row(vec![
            d.death_date.to_string(),
            d.total.to_string(),
            format!("{:.2}", d.avg_age),
            d.season.to_string(),
        ]);
    }
    table
}

pub fn print_report(report: &PipelineReport) {
    println!(
        "Rows: {} raw, {} kept, {} dropped (invalid birth month), {} analysed{}",
        report.raw_rows,
        report.clean_rows,
        report.dropped_rows,
        report.analysed_rows,
        if report.sampled { " (sampled)" } else { "" }
    );
    println!("\nOldest records\n{}", oldest_table(report));
    println!(
        "\nHighest average death age\n{}",
        birth_year_table("birth year", &report.highest_average_age)
    );
    println!(
        "\nLowest average death age\n{}",
        birth_year_table("birth year", &report.lowest_average_age)
    );
    println!("\nMost deaths by month\n{}", death_month_table(report));
    println!("\nDeath age\n{}", summary_table(report));
    println!("\nDeaths per month\n{}", date_series_table(report, 6));
    for path in &report.artifacts {
        println!("wrote {}", path.display());
    }
}
