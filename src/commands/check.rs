//! Check command implementation.
//!
//! Validates configuration and that every paging source can be read.

use herakles_paging_exporter::{BootTimeSource, PageFileSource, PagingSource, SwapSource};

use crate::config::{validate_effective_config, Config};

/// Validates configuration and source availability.
pub fn command_check(config: &Config) -> anyhow::Result<()> {
    println!("🔍 Herakles Paging Exporter - System Check");
    println!("==========================================");

    let mut all_ok = true;

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n📁 Checking paging sources...");
    match PagingSource::open(config.procfs_root(), config.test_data_file.as_deref()) {
        Ok(source) => {
            match source.boot_time() {
                Ok(secs) => println!("   ✅ Boot time: {} (seconds since epoch)", secs),
                Err(e) => {
                    println!("   ❌ Boot time unavailable, scraper cannot start: {}", e);
                    all_ok = false;
                }
            }

            match source.page_file_stats() {
                Ok(devices) => {
                    println!("   ✅ Page files: {} devices", devices.len());
                    for d in &devices {
                        println!(
                            "      ├─ {} used={} MB free={} MB",
                            d.device_name,
                            d.used_bytes / 1024 / 1024,
                            d.free_bytes / 1024 / 1024
                        );
                    }
                }
                Err(e) => {
                    println!("   ❌ Page files unavailable: {}", e);
                    all_ok = false;
                }
            }

            match source.swap_stats() {
                Ok(swap) => println!(
                    "   ✅ Swap stats: faults={} major={}",
                    swap.pg_fault, swap.pg_maj_fault
                ),
                Err(e) => {
                    println!("   ❌ Swap stats unavailable: {}", e);
                    all_ok = false;
                }
            }
        }
        Err(e) => {
            println!("   ❌ Cannot open paging source: {}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - system is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}
