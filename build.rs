//! Build script: stamps the build time and optionally embeds a default table.
//!
//! `CALTABLE_EMBED_TABLE=<path>` compiles the given culture data file into
//! the library as the built-in default table.

use std::path::Path;

fn main() {
    println!("cargo:rustc-check-cfg=cfg(caltable_embedded)");
    println!("cargo:rerun-if-env-changed=CALTABLE_EMBED_TABLE");
    println!("cargo:rerun-if-env-changed=CALTABLE_BUILD_STAMP");

    let stamp = std::env::var("CALTABLE_BUILD_STAMP").unwrap_or_else(|_| {
        let fmt = time::format_description::parse("[year]-[month]-[day] [hour]:[minute]:[second] UTC")
            .expect("valid stamp format");
        time::OffsetDateTime::now_utc()
            .format(&fmt)
            .unwrap_or_else(|_| "unknown".to_string())
    });
    println!("cargo:rustc-env=CALTABLE_BUILD_STAMP={}", stamp);

    if let Ok(table) = std::env::var("CALTABLE_EMBED_TABLE") {
        let path = Path::new(&table)
            .canonicalize()
            .unwrap_or_else(|e| panic!("CALTABLE_EMBED_TABLE={}: {}", table, e));
        println!("cargo:rerun-if-changed={}", path.display());
        println!("cargo:rustc-env=CALTABLE_EMBED_PATH={}", path.display());
        println!("cargo:rustc-cfg=caltable_embedded");
    }
}
