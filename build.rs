fn main() {
    let is_at_least_1_36 = version_check::is_min_version("1.36.0").unwrap_or(false);
    let is_at_least_1_57 = version_check::is_min_version("1.57.0").unwrap_or(false);
    let is_at_least_1_80 = version_check::is_min_version("1.80.0").unwrap_or(false);

    if !is_at_least_1_36 {
        println!("cargo:warning=keyed-slotmap requires rustc => 1.36.0");
    }

    if is_at_least_1_80 {
        println!("cargo:rustc-check-cfg=cfg(has_try_reserve)");
    }

    if is_at_least_1_57 {
        println!("cargo:rustc-cfg=has_try_reserve");
    }
}
