//! Stock functions the model can call

pub mod function;
pub mod registry;
pub mod validation;

pub use function::{FunctionKind, FunctionOutput, StockFunction, TickerArgs, WindowArgs};
pub use registry::FunctionRegistry;
pub use validation::validate_arguments;
