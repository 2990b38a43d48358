pub mod handler;
pub mod registry;
pub mod remote;

pub use handler::ToolDescriptor;
pub use registry::Toolset;
pub use remote::RemoteTool;
