use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=CATALOG_WIDGET_DATA_URL_HINT");

    // Packagers can bake a different default endpoint into the binary.
    if let Ok(hint) = env::var("CATALOG_WIDGET_DATA_URL_HINT") {
        let hint = hint.trim();
        if !hint.is_empty() {
            println!("cargo:rustc-env=CATALOG_WIDGET_DATA_URL_HINT={hint}");
        }
    }
}
