// Utility modules

pub mod mcp_content;
pub mod temp_files;
