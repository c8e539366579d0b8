use super::ui;
use crate::core::ads::{AdGate, AdStrategy, GateOutcome};
use chrono::Utc;

pub fn describe_outcome(outcome: &GateOutcome, strategies: &[AdStrategy]) -> String {
    match outcome {
        GateOutcome::Skipped { remaining } => {
            let total_minutes = remaining.as_secs() / 60;
            format!(
                "{} next ad allowed in {}h {:02}m",
                ui::style_text("Capped:", ui::StyleType::Warning),
                total_minutes / 60,
                total_minutes % 60
            )
        }
        GateOutcome::Shown { index } => {
            let src = strategies.get(*index).map_or("?", AdStrategy::src);
            format!(
                "{} strategy #{} ({})",
                ui::style_text("Shown:", ui::StyleType::Highlight),
                index + 1,
                src
            )
        }
        GateOutcome::NoStrategies => "No ad strategies configured.".to_string(),
    }
}

pub async fn run(gate: &AdGate) {
    let outcome = gate.run(Utc::now()).await;
    println!("{}", describe_outcome(&outcome, gate.strategies()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ads::default_strategies;
    use std::time::Duration;

    #[test]
    fn test_describe_outcome() {
        let strategies = default_strategies();

        let capped = describe_outcome(
            &GateOutcome::Skipped {
                remaining: Duration::from_secs(23 * 3600 + 5 * 60 + 30),
            },
            &strategies,
        );
        assert!(capped.contains("23h 05m"));

        let shown = describe_outcome(&GateOutcome::Shown { index: 4 }, &strategies);
        assert!(shown.contains("#5"));
        assert!(shown.contains("vignette.min.js"));

        assert_eq!(
            describe_outcome(&GateOutcome::NoStrategies, &[]),
            "No ad strategies configured."
        );
    }
}
