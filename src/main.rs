use gnss_converter::{ConverterConfig, GeodeticPoint};
use nalgebra::{Quaternion, UnitQuaternion};

const USAGE: &str = "<config.json> <latitude> <longitude> <altitude> [qw qx qy qz]";

/// One sample from the command line
#[derive(Debug, PartialEq)]
struct Sample {
    point: GeodeticPoint,
    orientation: Option<UnitQuaternion<f64>>,
}

fn parse_sample(args: &[String]) -> Result<Sample, Box<dyn std::error::Error>> {
    let values = args
        .iter()
        .map(|arg| arg.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()?;

    match values.as_slice() {
        [lat, lon, alt] => Ok(Sample {
            point: GeodeticPoint::new(*lat, *lon, *alt),
            orientation: None,
        }),
        [lat, lon, alt, w, x, y, z] => Ok(Sample {
            point: GeodeticPoint::new(*lat, *lon, *alt),
            orientation: Some(UnitQuaternion::from_quaternion(Quaternion::new(*w, *x, *y, *z))),
        }),
        _ => Err(format!("expected 3 or 7 numbers, got {}", values.len()).into()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 5 && args.len() != 9 {
        eprintln!(
            "Usage: {} {}",
            args.first().map_or("gnss-converter", |s| s.as_str()),
            USAGE
        );
        return Err("Invalid arguments".into());
    }

    let config = ConverterConfig::from_file(&args[1])?;
    let sample = parse_sample(&args[2..])?;
    let converter = config.build_converter()?;

    let output = match sample.orientation {
        Some(orientation) => {
            serde_json::to_string_pretty(&converter.convert_pose(&sample.point, &orientation)?)?
        }
        None => serde_json::to_string_pretty(&converter.convert(&sample.point)?)?,
    };
    println!("{}", output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_position_only() {
        let sample = parse_sample(&args(&["35.6812", "139.7671", "30.0"])).unwrap();
        assert_eq!(sample.point, GeodeticPoint::new(35.6812, 139.7671, 30.0));
        assert!(sample.orientation.is_none());
    }

    #[test]
    fn test_parse_with_orientation() {
        let sample = parse_sample(&args(&["35", "139", "0", "2", "0", "0", "0"])).unwrap();
        let orientation = sample.orientation.unwrap();
        assert!((orientation.scalar() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_sample(&args(&["35", "139"])).is_err());
        assert!(parse_sample(&args(&["35", "east", "0"])).is_err());
    }
}
