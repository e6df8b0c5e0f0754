use chrono::NaiveDateTime;
use dwd_temperature::{
    consumption_intervals, ConversionFactors, DwdClient, DwdError, LinearFit, MeterReading,
    DEFAULT_STATION,
};

/// Readings as `(taken at, meter m³, remark)`.
const READINGS: &[(&str, f64, Option<&str>)] = &[
    ("2024-01-02 07:45:00", 18_204.3, None),
    ("2024-01-09 08:10:00", 18_262.9, None),
    ("2024-01-16 07:55:00", 18_331.4, None),
    ("2024-01-23 19:20:00", 18_389.0, None),
    ("2024-01-30 08:00:00", 18_431.7, Some("estimated")),
    ("2024-02-06 08:05:00", 18_478.2, None),
    ("2024-02-13 07:50:00", 18_520.6, None),
    ("2024-02-20 18:30:00", 18_559.1, None),
];

#[tokio::main]
async fn main() -> Result<(), DwdError> {
    env_logger::init();

    let readings: Vec<MeterReading> = READINGS
        .iter()
        .map(|&(taken_at, meter_m3, remark)| {
            let taken_at = NaiveDateTime::parse_from_str(taken_at, "%Y-%m-%d %H:%M:%S")
                .expect("valid reading time");
            let reading = MeterReading::new(taken_at, meter_m3);
            match remark {
                Some(remark) => reading.with_remark(remark),
                None => reading,
            }
        })
        .collect();

    let client = DwdClient::new().await?;
    let mut series = client.hourly_temperatures(DEFAULT_STATION).call().await?;
    let intervals = consumption_intervals(&readings, &mut series, &ConversionFactors::default())?;

    for i in &intervals {
        println!(
            "{} .. {}  {:5.2} d  {:6.2} kWh/d  {:5.2} °C",
            i.start, i.end, i.days, i.energy_kwh_per_day, i.mean_temperature
        );
    }

    let fit = LinearFit::from_intervals(&intervals)?;
    println!(
        "energy = {:.3} * T + {:.3}  (R² = {:.4}, n = {})",
        fit.slope, fit.intercept, fit.r_squared, fit.samples
    );
    Ok(())
}
