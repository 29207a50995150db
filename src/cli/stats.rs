//! Stats command implementation

use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::data::QuickStats;
use crate::error::Result;
use crate::output::{Formattable, json, progress};

/// One counter for table display
#[derive(Tabled, Serialize)]
struct StatDisplay {
    #[tabled(rename = "METRIC")]
    metric: &'static str,
    #[tabled(rename = "COUNT")]
    count: usize,
}

fn rows(stats: &QuickStats) -> Vec<StatDisplay> {
    vec![
        StatDisplay {
            metric: "Internal directory entries",
            count: stats.internal_count,
        },
        StatDisplay {
            metric: "Activities",
            count: stats.activities_count,
        },
        StatDisplay {
            metric: "Reference files",
            count: stats.files_count,
        },
    ]
}

/// Run the stats command
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let data = ctx.data_service()?;

    let bar = progress::spinner(ctx.format, "Counting records...");
    let stats = data.get_quick_stats().await;
    bar.finish_and_clear();
    let stats = stats?;

    match ctx.format {
        OutputFormat::Pretty => {
            println!("{}\n", "FMA Portal".bold());
            for row in rows(&stats) {
                println!("  {:>5}  {}", row.count.to_string().bold().cyan(), row.metric);
            }
        }
        OutputFormat::Json => println!("{}", json::format_json(&stats)?),
        format => rows(&stats).print(format)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_follow_counter_order() {
        let stats = QuickStats {
            internal_count: 4,
            activities_count: 2,
            files_count: 9,
        };

        let counts: Vec<usize> = rows(&stats).iter().map(|r| r.count).collect();

        assert_eq!(counts, vec![4, 2, 9]);
    }
}
