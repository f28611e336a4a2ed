fn main() {
    // Release pipelines export STRATA_GIT_SHA; local builds ask git.
    let git_sha = std::env::var("STRATA_GIT_SHA").unwrap_or_else(|_| {
        std::process::Command::new("git")
            .args(["rev-parse", "--short", "HEAD"])
            .output()
            .ok()
            .filter(|output| output.status.success())
            .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    });
    println!("cargo:rustc-env=STRATA_GIT_SHA={}", git_sha);
    println!("cargo:rerun-if-env-changed=STRATA_GIT_SHA");

    let build_date = std::env::var("STRATA_BUILD_DATE").unwrap_or_else(|_| {
        std::process::Command::new("date")
            .arg("+%Y-%m-%d")
            .output()
            .ok()
            .filter(|output| output.status.success())
            .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    });
    println!("cargo:rustc-env=STRATA_BUILD_DATE={}", build_date);
    println!("cargo:rerun-if-env-changed=STRATA_BUILD_DATE");
}
