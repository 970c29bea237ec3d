use actix_web::{dev::Payload, http::header::AUTHORIZATION, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

/// Optional bearer token extractor for routes that work with or without an
/// identity (tracking, session merge). Extraction never fails: a missing
/// or malformed Authorization header yields `None`. The token is forwarded
/// to the commerce backend verbatim; this server does not validate it.
#[derive(Debug, Clone)]
pub struct MaybeBearer(pub Option<String>);

impl MaybeBearer {
    pub fn token(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl FromRequest for MaybeBearer {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        ready(Ok(MaybeBearer(token)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_rt::test]
    async fn test_extracts_bearer_token() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer guest-token-xyz"))
            .to_http_request();

        let bearer = MaybeBearer::from_request(&req, &mut Payload::None)
            .await
            .unwrap();
        assert_eq!(bearer.token(), Some("guest-token-xyz"));
    }

    #[actix_rt::test]
    async fn test_absent_header_yields_none() {
        let req = TestRequest::default().to_http_request();

        let bearer = MaybeBearer::from_request(&req, &mut Payload::None)
            .await
            .unwrap();
        assert_eq!(bearer.token(), None);
    }

    #[actix_rt::test]
    async fn test_malformed_header_yields_none() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_http_request();

        let bearer = MaybeBearer::from_request(&req, &mut Payload::None)
            .await
            .unwrap();
        assert_eq!(bearer.token(), None);

        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer "))
            .to_http_request();
        let bearer = MaybeBearer::from_request(&req, &mut Payload::None)
            .await
            .unwrap();
        assert_eq!(bearer.token(), None);
    }
}
