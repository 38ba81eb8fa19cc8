//! Lines typed on stdin

use geo_search::{Category, Origin};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Text(String),
    More,
    Refresh,
    Category(Option<Category>),
    Radius(u32),
    At(Origin),
    Quit,
}

pub fn parse(line: &str) -> Result<Input, String> {
    let Some(command) = line.strip_prefix(':') else {
        return Ok(Input::Text(line.to_string()));
    };

    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    match (name, args.as_slice()) {
        ("more" | "m", []) => Ok(Input::More),
        ("refresh" | "r", []) => Ok(Input::Refresh),
        ("quit" | "q", []) => Ok(Input::Quit),
        ("category" | "c", ["all"]) => Ok(Input::Category(None)),
        ("category" | "c", [name]) => Category::from_str(name)
            .map(|c| Input::Category(Some(c)))
            .map_err(|_| format!("unknown category '{name}', try materials, tools or all")),
        ("radius", [meters]) => meters
            .parse()
            .map(Input::Radius)
            .map_err(|_| format!("'{meters}' is not a radius in meters")),
        ("at", [lat, lng]) => {
            let lat: f64 = lat.parse().map_err(|_| format!("'{lat}' is not a latitude"))?;
            let lng: f64 = lng.parse().map_err(|_| format!("'{lng}' is not a longitude"))?;
            Origin::try_new(lat, lng)
                .map(Input::At)
                .map_err(|e| e.to_string())
        }
        _ => Err(format!(
            "unknown command ':{command}', try :more :refresh :category :radius :at :quit"
        )),
    }
}
