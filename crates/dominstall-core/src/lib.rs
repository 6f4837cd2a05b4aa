mod descriptor;
mod version;

pub use descriptor::{validate_product_name, SoftwareDescriptor};
pub use version::{parse_version, BuildNumber, ParsedVersion};
