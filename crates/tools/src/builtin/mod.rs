//! Built-in tools.

mod calculator;
mod expression;
mod location;
mod weather;

pub use calculator::{calculate, CalculatorTool};
pub use expression::{evaluate, ExprError, Number};
pub use location::{find_location, LocationTool};
pub use weather::{WeatherClient, WeatherTool, DEFAULT_WEATHER_URL};
