use axum::Json;
use serde::Serialize;

/// `{"data": ...}` success envelope.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

pub fn data<T: Serialize>(data: T) -> Json<Data<T>> {
    Json(Data { data })
}
