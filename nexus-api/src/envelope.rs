use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Error;

/// Application code the backend uses for a missing, expired or forged token
pub const TOKEN_INVALID_CODE: i64 = 30002;

/// The `{code, data, msg}` wrapper around every backend answer
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Envelope {
    #[serde(default)]
    pub code: i64,

    #[serde(default)]
    pub data: Value,

    #[serde(default)]
    pub msg: String,
}

impl Envelope {
    /// Parses a 2xx body and rejects non-zero application codes.
    ///
    /// Some backend handlers write several JSON objects back to back (eg. a
    /// success payload followed by an error); the last one is authoritative.
    pub fn parse(body: &str) -> Result<Envelope, Error> {
        let last = serde_json::Deserializer::from_str(body)
            .into_iter::<Value>()
            .map_while(Result::ok)
            .last();
        let envelope = match last {
            Some(value) => serde_json::from_value::<Envelope>(value)
                .map_err(|e| Error::MalformedResponse(e.to_string()))?,
            None => {
                let msg = match body.trim() {
                    "" => "Invalid response format",
                    text => text,
                };
                return Err(Error::Application {
                    code: -1,
                    message: msg.to_string(),
                });
            }
        };
        if envelope.code != 0 {
            return Err(Error::from_code(envelope.code, &envelope.msg));
        }
        Ok(envelope)
    }

    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, Error> {
        if self.data.is_null() {
            return Err(Error::MalformedResponse(String::from(
                "response carries no data",
            )));
        }
        serde_json::from_value(self.data).map_err(|e| Error::MalformedResponse(e.to_string()))
    }

    /// Like `into_data`, for endpoints where the payload is optional
    pub fn into_optional_data<T: DeserializeOwned>(self) -> Result<Option<T>, Error> {
        if self.data.is_null() {
            return Ok(None);
        }
        self.into_data().map(Some)
    }

    pub fn success(data: impl serde::Serialize) -> Envelope {
        Envelope {
            code: 0,
            data: serde_json::to_value(data).unwrap_or(Value::Null),
            msg: String::from("success"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CommentList, LikeState};

    #[test]
    fn success_envelope() {
        let env = Envelope::parse(r#"{"code":0,"data":{"liked":true,"like_count":3},"msg":"ok"}"#)
            .unwrap();
        assert_eq!(
            env.into_data::<LikeState>().unwrap(),
            LikeState {
                liked: true,
                like_count: 3,
            },
        );
    }

    #[test]
    fn non_zero_code_is_an_error() {
        assert_eq!(
            Envelope::parse(r#"{"code":40001,"data":null,"msg":"post not found"}"#),
            Err(Error::Application {
                code: 40001,
                message: String::from("post not found"),
            }),
        );
        assert!(Envelope::parse(r#"{"code":30002,"msg":"token"}"#)
            .unwrap_err()
            .is_token_invalid());
    }

    #[test]
    fn concatenated_objects_take_the_last() {
        let body = r#"{"code":0,"data":{"comments":[]},"msg":"ok"}{"code":50001,"msg":"db error"}"#;
        assert_eq!(
            Envelope::parse(body),
            Err(Error::Application {
                code: 50001,
                message: String::from("db error"),
            }),
        );
    }

    #[test]
    fn null_comment_list_is_empty() {
        let env = Envelope::parse(r#"{"code":0,"data":{"Comments":null},"msg":"ok"}"#).unwrap();
        let list = env.into_optional_data::<CommentList>().unwrap().unwrap();
        assert!(list.comments.is_empty());
    }

    #[test]
    fn garbage_body() {
        assert_eq!(
            Envelope::parse("<html>oops</html>"),
            Err(Error::Application {
                code: -1,
                message: String::from("<html>oops</html>"),
            }),
        );
        assert_eq!(
            Envelope::parse("  "),
            Err(Error::Application {
                code: -1,
                message: String::from("Invalid response format"),
            }),
        );
    }

    #[test]
    fn missing_data() {
        let env = Envelope::parse(r#"{"code":0,"msg":"ok"}"#).unwrap();
        assert!(matches!(
            env.clone().into_data::<CommentList>(),
            Err(Error::MalformedResponse(_))
        ));
        assert_eq!(env.into_optional_data::<CommentList>(), Ok(None));
    }

    #[test]
    fn toggle_without_count_is_rejected() {
        let env = Envelope::parse(r#"{"code":0,"data":{"liked":true}}"#).unwrap();
        assert!(matches!(
            env.into_data::<LikeState>(),
            Err(Error::MalformedResponse(_))
        ));
    }
}
