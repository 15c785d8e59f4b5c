use crate::helpers::JsonResponse;
use actix_web::web::Bytes;
use actix_web::Error;
use serde::de::DeserializeOwned;
use serde_valid::Validate;
use std::str;

/// Deserialize a JSON body reporting the failing field path, then run form validation.
pub fn parse_form<T>(body: &Bytes) -> Result<T, Error>
where
    T: DeserializeOwned + Validate,
{
    let body_str = str::from_utf8(body)
        .map_err(|err| JsonResponse::<()>::build().bad_request(err.to_string()))?;
    let deserializer = &mut serde_json::Deserializer::from_str(body_str);
    let form: T = serde_path_to_error::deserialize(deserializer).map_err(|err| {
        let path = err.path().to_string();
        let msg = if path == "." {
            format!("Invalid request body: {}", err.inner())
        } else {
            format!("{}: {}", path, err.inner())
        };
        JsonResponse::<()>::build().bad_request(msg)
    })?;

    if let Err(errors) = form.validate() {
        let errors = errors.to_string();
        tracing::debug!("Invalid data received {:?}", &errors);
        return Err(JsonResponse::<()>::build().form_error(errors));
    }

    Ok(form)
}
