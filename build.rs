use std::env;
use std::path::PathBuf;

// The default backend links the system FFmpeg through ffmpeg-sys-next.
// Discovery is painless on Unix (pkg-config) but fragile on Windows, so we
// print hints there instead of letting the sys crate fail cryptically.
fn main() {
    println!("cargo:rerun-if-env-changed=FFMPEG_DIR");
    println!("cargo:rerun-if-env-changed=VCPKG_ROOT");
    println!("cargo:rerun-if-env-changed=VCPKGRS_DYNAMIC");
    println!("cargo:rerun-if-env-changed=VCPKGRS_TRIPLET");

    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }
    if env::var_os("FFMPEG_DIR").is_some() {
        // Explicit location wins; nothing to guess.
        return;
    }

    match vcpkg_ffmpeg_dir() {
        Some(dir) if dir.exists() => {
            println!(
                "cargo:warning=Found a vcpkg tree at {}. Set FFMPEG_DIR={} so ffmpeg-sys-next uses it explicitly.",
                dir.display(),
                dir.display(),
            );
            if env::var_os("VCPKGRS_DYNAMIC").is_none() {
                println!(
                    "cargo:warning=For dynamic vcpkg FFmpeg builds, also set VCPKGRS_DYNAMIC=1."
                );
            }
        }
        Some(dir) => {
            println!(
                "cargo:warning=VCPKG_ROOT is set, but {} does not contain an FFmpeg install.",
                dir.display(),
            );
        }
        None => {
            println!(
                "cargo:warning=FFMPEG_DIR is not set. On Windows, install FFmpeg through vcpkg and set VCPKG_ROOT and FFMPEG_DIR."
            );
        }
    }
}

fn vcpkg_ffmpeg_dir() -> Option<PathBuf> {
    let root = env::var("VCPKG_ROOT").ok()?;
    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    Some(PathBuf::from(root).join("installed").join(triplet))
}
