//! services/planner/src/bin/openapi.rs
//!
//! Dumps the planner's OpenAPI document. Writes `openapi.json` by default, another
//! path when one is given, or stdout for `-`.

use planner_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let target = std::env::args().nth(1);
    let json = ApiDoc::openapi().to_pretty_json()?;

    match target.as_deref() {
        Some("-") => println!("{}", json),
        other => {
            let path = other.unwrap_or("openapi.json");
            std::fs::write(path, json)?;
            eprintln!("OpenAPI document written to {}", path);
        }
    }
    Ok(())
}
