use axum::extract::State;
use axum::Json;
use mnemono_core::store::CycleStore;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/cycle — derived view of the live cycle, or `{"active": false}`.
pub async fn get_cycle(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store();
    let result = tokio::task::spawn_blocking(move || {
        let today = chrono::Local::now().date_naive();
        let Some(cycle) = store.load() else {
            return Ok::<_, serde_json::Error>(serde_json::json!({ "active": false }));
        };
        let mut view = serde_json::to_value(cycle.view(today))?;
        if let Some(obj) = view.as_object_mut() {
            obj.insert("active".to_string(), serde_json::Value::Bool(true));
        }
        Ok(view)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
