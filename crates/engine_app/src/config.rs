//! Command-line configuration.

use clap::Parser;
use engine_property::glam::{DVec2, DVec3, DVec4, Quat, Vec2, Vec3, Vec4};
use engine_property::{Property, PropertyKind, sid};

/// Spawns entities from a prototype and prints their component properties.
#[derive(Debug, Clone, Parser)]
#[command(name = "engine_app", about = "Entity property demo")]
pub struct AppConfig {
    /// Number of entities to spawn.
    #[arg(short = 'n', long, default_value_t = 3)]
    pub count: u32,

    /// Prototype to spawn from (`crate`, `actor` or `soldier`).
    #[arg(short, long, default_value = "soldier")]
    pub spawner: String,

    /// Property overrides applied to every spawned entity, as
    /// `Component.Property=value` (vectors as comma-separated numbers).
    #[arg(long = "set", value_parser = parse_override)]
    pub overrides: Vec<PropertyOverride>,

    /// Print snapshots as JSON instead of log lines.
    #[arg(long)]
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            count: 3,
            spawner: "soldier".to_owned(),
            overrides: Vec::new(),
            json: false,
        }
    }
}

/// One `Component.Property=value` override. The value stays unparsed until
/// the property's kind is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyOverride {
    pub component: String,
    pub property: String,
    pub value: String,
}

pub fn parse_override(raw: &str) -> Result<PropertyOverride, String> {
    let (path, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected Component.Property=value, got '{raw}'"))?;
    let (component, property) = path
        .split_once('.')
        .ok_or_else(|| format!("expected Component.Property, got '{path}'"))?;
    if component.is_empty() || property.is_empty() {
        return Err(format!("empty component or property name in '{raw}'"));
    }
    Ok(PropertyOverride {
        component: component.trim().to_owned(),
        property: property.trim().to_owned(),
        value: value.trim().to_owned(),
    })
}

/// Parses `raw` as a value of `kind`.
pub fn parse_value(kind: PropertyKind, raw: &str) -> Result<Property, String> {
    let value = match kind {
        PropertyKind::Bool => Property::Bool(parse_scalar(raw)?),
        PropertyKind::Int => Property::Int(parse_scalar(raw)?),
        PropertyKind::UInt => Property::UInt(parse_scalar(raw)?),
        PropertyKind::Float => Property::Float(parse_scalar(raw)?),
        PropertyKind::Double => Property::Double(parse_scalar(raw)?),
        PropertyKind::String => Property::String(raw.to_owned()),
        PropertyKind::StringId => Property::StringId(sid(raw)),
        PropertyKind::Vec2 => Property::Vec2(Vec2::from_array(parse_components(raw)?)),
        PropertyKind::Vec3 => Property::Vec3(Vec3::from_array(parse_components(raw)?)),
        PropertyKind::Vec4 => Property::Vec4(Vec4::from_array(parse_components(raw)?)),
        PropertyKind::DVec2 => Property::DVec2(DVec2::from_array(parse_components(raw)?)),
        PropertyKind::DVec3 => Property::DVec3(DVec3::from_array(parse_components(raw)?)),
        PropertyKind::DVec4 => Property::DVec4(DVec4::from_array(parse_components(raw)?)),
        PropertyKind::Quat => Property::Quat(Quat::from_array(parse_components(raw)?)),
        PropertyKind::Matrix | PropertyKind::Array | PropertyKind::Group => {
            return Err(format!("{kind} properties cannot be set from the command line"));
        }
    };
    Ok(value)
}

fn parse_scalar<T: std::str::FromStr>(raw: &str) -> Result<T, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("cannot parse '{raw}'"))
}

fn parse_components<T: std::str::FromStr, const N: usize>(raw: &str) -> Result<[T; N], String> {
    let parts = raw
        .split(',')
        .map(parse_scalar)
        .collect::<Result<Vec<T>, _>>()?;
    let found = parts.len();
    parts
        .try_into()
        .map_err(|_| format!("expected {N} components, got {found} in '{raw}'"))
}
