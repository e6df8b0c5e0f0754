use chrono::NaiveDate;
use dwd_temperature::{DwdClient, DwdError, DEFAULT_STATION};

#[tokio::main]
async fn main() -> Result<(), DwdError> {
    env_logger::init();

    let client = DwdClient::new().await?;
    let mut series = client.hourly_temperatures(DEFAULT_STATION).call().await?;
    let zone = series.default_zone();

    let noon = NaiveDate::from_ymd_opt(2024, 1, 5)
        .and_then(|d| d.and_hms_opt(12, 30, 0))
        .expect("valid date");
    println!("{noon}: {:.2} °C", series.temperature_at(noon)?);

    for day in 1..=7 {
        let date = NaiveDate::from_ymd_opt(2024, 1, day).expect("valid date");
        println!("{date}: {:.2} °C", series.mean_over_day(date, &zone)?);
    }

    for (month, mean) in series.monthly_means(2024, &zone)? {
        println!("2024-{month:02}: {mean:.1} °C");
    }
    Ok(())
}
