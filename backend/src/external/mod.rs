//! External API integrations

pub mod retrieval;
pub mod weather;

pub use retrieval::{HttpRetrievalClient, RetrievalError, RetrievalProvider, RetrievalQuery, RetrievalResult};
pub use weather::{OpenMeteoClient, WeatherProvider};
