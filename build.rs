fn main() {
    // Minimum macOS version for the AppKit and ApplicationServices calls
    // the platform layer makes.
    println!("cargo:rustc-env=MACOSX_DEPLOYMENT_TARGET=12.0");
}
