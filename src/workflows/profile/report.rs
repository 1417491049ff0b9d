use super::assembler::Profile;
use super::levels::Level;
use super::quality::QualityFlag;
use std::fmt;

/// Plain-text rendering of a [`Profile`] for terminals and `report.txt` files.
pub struct TextReport<'a> {
    profile: &'a Profile,
}

impl<'a> TextReport<'a> {
    pub fn new(profile: &'a Profile) -> Self {
        Self { profile }
    }
}

fn score_cell(score: Option<f64>, level: Level) -> String {
    match score {
        Some(value) => format!("{value:>5.1}  {}", level.label()),
        None => format!("{:>5}  {}", "-", level.label()),
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let profile = self.profile;
        writeln!(f, "Learning Energy Profile: {}", profile.id)?;
        writeln!(
            f,
            "Generated {} (schema {})",
            profile.meta.generated_at.format("%Y-%m-%d %H:%M UTC"),
            profile.meta.version
        )?;

        writeln!(f, "\nDimensions")?;
        for entry in &profile.dimensions {
            writeln!(
                f,
                "- {:<22} {}  ({} answered, {} missing)",
                entry.dimension.label(),
                score_cell(entry.score, entry.level),
                entry.item_count_used,
                entry.missing_count
            )?;
        }

        writeln!(f, "\nAdditional indices")?;
        for entry in &profile.additional_indices {
            writeln!(
                f,
                "- {:<22} {}  ({} answered, {} missing)",
                entry.index.label(),
                score_cell(entry.score, entry.level),
                entry.item_count_used,
                entry.missing_count
            )?;
            if let Some(balance) = &entry.balance {
                writeln!(
                    f,
                    "  balance {:+.2}: {}",
                    balance.balance_score,
                    balance.orientation.label()
                )?;
            }
        }

        let quality = &profile.response_quality;
        writeln!(f, "\nResponse quality")?;
        writeln!(
            f,
            "- Completeness: {}/{} items ({:.1}%)",
            quality.answered_items,
            quality.expected_items,
            quality.completeness_ratio * 100.0
        )?;
        match quality.rating_variance {
            Some(variance) => writeln!(f, "- Rating variance: {variance:.2}")?,
            None => writeln!(f, "- Rating variance: n/a")?,
        }
        writeln!(
            f,
            "- Extreme answers: {:.1}%",
            quality.extreme_response_ratio * 100.0
        )?;

        if quality.quality_flag == QualityFlag::Ok {
            writeln!(f, "- Warnings: none")?;
        } else {
            writeln!(f, "- Warnings")?;
            for warning in &quality.warnings {
                writeln!(f, "  * {}", warning.label())?;
            }
            if !quality.low_coverage_constructs.is_empty() {
                let names: Vec<_> = quality
                    .low_coverage_constructs
                    .iter()
                    .map(|construct| construct.0.id())
                    .collect();
                writeln!(f, "  * low coverage: {}", names.join(", "))?;
            }
        }

        Ok(())
    }
}
