pub mod app;
mod commands;
pub mod error;
pub mod infra;

use infra::{init_db, DbOptions};
use std::path::PathBuf;
use tauri::{Emitter, Manager};

fn app_data_dir() -> PathBuf {
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("com.tiquetera.app")
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .setup(|app| {
            if cfg!(debug_assertions) {
                app.handle().plugin(
                    tauri_plugin_log::Builder::default()
                        .level(log::LevelFilter::Info)
                        .build(),
                )?;
            }

            let data_dir = app
                .handle()
                .path()
                .app_data_dir()
                .unwrap_or_else(|_| app_data_dir());
            let db_path = data_dir.join("tickets.db");
            log::info!("DB path: {:?}", db_path);

            // Windows are created after setup returns, so no frontend code
            // runs against an unprovisioned store. A failure here aborts
            // startup before any UI is shown.
            let options = DbOptions {
                live: true,
                vector: true,
            };
            let pool = init_db(&db_path, options).map_err(|e| {
                log::error!("DB init failed: {}", e);
                e
            })?;

            let changes = pool.changes().subscribe();
            let handle = app.handle().clone();
            std::thread::spawn(move || {
                while let Ok(change) = changes.recv() {
                    let _ = handle.emit("db:change", &change);
                }
            });

            app.manage(pool);

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::product::cmd_product_create,
            commands::product::cmd_product_get,
            commands::product::cmd_product_list,
            commands::product::cmd_product_update,
            commands::product::cmd_product_delete,
            commands::product::cmd_product_search_similar,
            commands::ticket::cmd_ticket_create,
            commands::ticket::cmd_ticket_get,
            commands::ticket::cmd_ticket_list,
            commands::ticket::cmd_ticket_cancel,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
