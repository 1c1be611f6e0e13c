use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use pirate_weather::units::{convert, convert_temperature, format_time, MeasureUnit, TemperatureUnit};
use pirate_weather::{Block, ForecastOptions, ForecastResponse, Units};

#[tokio::main]
async fn main() -> Result<()> {
    pirate_core::init()?;

    let (config, _) = pirate_core::Config::load_validated()?;
    let client = pirate_core::build_client(&config)?;
    let (lat, lon) = (config.location.latitude, config.location.longitude);

    println!("Current Forecast:");
    let options = ForecastOptions::new()
        .units(Units::Si)
        .exclude([Block::Minutely])
        .extend_hourly()
        .version(2);
    let forecast = client
        .forecast(lat, lon, options)
        .await
        .context("Error getting forecast")?;
    print_forecast(&forecast);

    println!("\nTime Machine (Yesterday's Weather):");
    let yesterday = Utc::now() - Duration::days(1);
    let past = client
        .time_machine(lat, lon, yesterday, ForecastOptions::new().units(Units::Si))
        .await
        .context("Error getting time machine data")?;
    print_forecast(&past);

    if let Some(now) = &forecast.currently {
        let temp_f = convert_temperature(now.temperature, TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit);
        println!("Current temperature: {:.2}°C ({:.2}°F)", now.temperature, temp_f);

        let wind_kmh = convert(now.wind_speed, MeasureUnit::MetersPerSecond, MeasureUnit::KilometersPerHour)?;
        println!("Current wind speed: {:.2} m/s ({:.2} km/h)", now.wind_speed, wind_kmh);
    }

    println!("\nForecast with different unit systems:");
    for units in Units::ALL {
        let forecast = client
            .forecast(lat, lon, ForecastOptions::new().units(units))
            .await
            .with_context(|| format!("Error getting forecast with {} units", units))?;
        let (temp, wind) = forecast
            .currently
            .as_ref()
            .map_or((0.0, 0.0), |c| (c.temperature, c.wind_speed));
        println!("{} units - Temperature: {:.2}, Wind Speed: {:.2}", units, temp, wind);
    }

    let budget = client.rate_limiter().snapshot();
    tracing::info!(
        capacity = budget.capacity,
        tokens = budget.tokens,
        cached = client.cache().len(),
        "Done"
    );

    client.shutdown();
    Ok(())
}

fn print_forecast(forecast: &ForecastResponse) {
    println!("Location: {:.4}, {:.4}", forecast.latitude, forecast.longitude);
    println!("Timezone: {}", forecast.timezone);

    if let Some(now) = &forecast.currently {
        println!("Time: {}", format_time(now.time).unwrap_or_default());
        println!("Temperature: {:.2}°C", now.temperature);
        println!("Feels like: {:.2}°C", now.apparent_temperature);
        println!("Humidity: {:.2}%", now.humidity * 100.0);
        println!("Wind Speed: {:.2} m/s", now.wind_speed);
        println!("Wind Direction: {:.2}°", now.wind_bearing);
        println!("Cloud Cover: {:.2}%", now.cloud_cover * 100.0);
        println!("UV Index: {:.1}", now.uv_index);
        println!("Visibility: {:.2} km", now.visibility);
        if let Some(fire) = now.fire_index {
            println!("Fire Index: {:.2}", fire);
        }
        if let Some(smoke) = now.smoke {
            println!("Smoke: {:.2}", smoke);
        }
    }

    if !forecast.alerts.is_empty() {
        println!("\nWeather Alerts:");
        for alert in &forecast.alerts {
            println!("- {}: {}", alert.title, alert.description);
        }
    }

    if let Some(hourly) = forecast.hourly.as_ref().filter(|b| !b.data.is_empty()) {
        println!("\nHourly forecast available for the next {} hours", hourly.data.len());
    }
    if let Some(daily) = forecast.daily.as_ref().filter(|b| !b.data.is_empty()) {
        println!("\nDaily forecast available for the next {} days", daily.data.len());
    }
}
