//! Predict command implementation

use crate::cli::output::{format_report_json, format_report_table};
use crate::cli::PredictArgs;
use crate::config::LifelineConfig;
use crate::prediction::{PredictionClient, Predictor, VitalsInput};

impl From<&PredictArgs> for VitalsInput {
    fn from(args: &PredictArgs) -> Self {
        Self {
            heart_rate: args.heart_rate,
            blood_pressure_systolic: args.systolic,
            blood_pressure_diastolic: args.diastolic,
            spo2: args.spo2,
            temperature: args.temperature,
            glucose: args.glucose,
        }
    }
}

/// Resolve the prediction endpoint and timeout: file, then env, then flag.
fn load_config(args: &PredictArgs) -> Result<LifelineConfig, Box<dyn std::error::Error>> {
    let mut config = if args.config.exists() {
        LifelineConfig::load(Some(&args.config))?
    } else {
        LifelineConfig::default()
    }
    .with_env_overrides();

    if let Some(ref endpoint) = args.endpoint {
        config.prediction.endpoint = endpoint.clone();
    }
    Ok(config)
}

/// Handle `lifeline predict` command
pub async fn handle_predict(args: &PredictArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(args)?;
    let input = VitalsInput::from(args);

    let predictor = Predictor::new(PredictionClient::new(
        config.prediction.endpoint.clone(),
        config.prediction_timeout(),
    ));
    let report = predictor.predict(&input).await?;

    if args.json {
        Ok(format_report_json(&report)?)
    } else {
        Ok(format_report_table(&report))
    }
}
