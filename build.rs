// build.rs

fn main() {
    // Only the X11 display driver links against a system library.
    if std::env::var_os("CARGO_FEATURE_X11").is_none() {
        return;
    }

    // Prefer pkg-config; fall back to plain linker flags when it is missing
    // or the .pc file cannot be found.
    match pkg_config::probe_library("x11") {
        Ok(_) => {
            eprintln!("pkg-config found x11. Linking configured automatically.");
        }
        Err(err) => {
            eprintln!(
                "pkg-config failed for library 'x11' ({}). Falling back to manual linking.",
                err
            );
            println!("cargo:rustc-link-lib=X11");
            println!("cargo:rustc-link-search=/usr/lib");
        }
    }
}
