use crate::{de, UserId};

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct User {
    #[serde(alias = "ID")]
    pub id: UserId,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    /// First letter of the username, for avatar placeholders
    pub fn initial(&self) -> char {
        self.username
            .chars()
            .next()
            .map(|c| c.to_uppercase().next().unwrap_or(c))
            .unwrap_or('U')
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(from = "u8", into = "u8")]
pub enum Gender {
    #[default]
    Unspecified,
    Male,
    Female,
}

impl From<u8> for Gender {
    fn from(v: u8) -> Gender {
        match v {
            1 => Gender::Male,
            2 => Gender::Female,
            _ => Gender::Unspecified,
        }
    }
}

impl From<Gender> for u8 {
    fn from(g: Gender) -> u8 {
        match g {
            Gender::Unspecified => 0,
            Gender::Male => 1,
            Gender::Female => 2,
        }
    }
}

/// The requesting user's own profile, as returned by `GET /me/`
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Profile {
    #[serde(deserialize_with = "de::null_as_default")]
    pub username: String,
    #[serde(deserialize_with = "de::null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "de::null_as_default")]
    pub avatar: String,
    #[serde(deserialize_with = "de::null_as_default")]
    pub gender: Gender,
    #[serde(deserialize_with = "de::null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "de::null_as_default")]
    pub qq: String,
    #[serde(deserialize_with = "de::null_as_default")]
    pub wechat: String,
    #[serde(deserialize_with = "de::null_as_default")]
    pub bio: String,
    #[serde(deserialize_with = "de::null_as_default")]
    pub is_phone_public: bool,
    #[serde(deserialize_with = "de::null_as_default")]
    pub is_email_public: bool,
    #[serde(deserialize_with = "de::null_as_default")]
    pub is_qq_public: bool,
    #[serde(deserialize_with = "de::null_as_default")]
    pub is_wechat_public: bool,
    #[serde(deserialize_with = "de::null_as_default")]
    pub is_gender_public: bool,
}

/// Body of `PUT /me/`, with the privacy flags flattened next to the fields
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ProfileUpdate {
    pub gender: Gender,
    pub phone: String,
    pub qq: String,
    pub wechat: String,
    pub bio: String,
    pub is_phone_public: bool,
    pub is_email_public: bool,
    pub is_qq_public: bool,
    pub is_wechat_public: bool,
    pub is_gender_public: bool,
}

impl From<&Profile> for ProfileUpdate {
    fn from(p: &Profile) -> ProfileUpdate {
        ProfileUpdate {
            gender: p.gender,
            phone: p.phone.clone(),
            qq: p.qq.clone(),
            wechat: p.wechat.clone(),
            bio: p.bio.clone(),
            is_phone_public: p.is_phone_public,
            is_email_public: p.is_email_public,
            is_qq_public: p.is_qq_public,
            is_wechat_public: p.is_wechat_public,
            is_gender_public: p.is_gender_public,
        }
    }
}

impl Profile {
    pub fn apply(&mut self, u: &ProfileUpdate) {
        self.gender = u.gender;
        self.phone = u.phone.clone();
        self.qq = u.qq.clone();
        self.wechat = u.wechat.clone();
        self.bio = u.bio.clone();
        self.is_phone_public = u.is_phone_public;
        self.is_email_public = u.is_email_public;
        self.is_qq_public = u.is_qq_public;
        self.is_wechat_public = u.is_wechat_public;
        self.is_gender_public = u.is_gender_public;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_accepts_upper_case_id() {
        let u: User = serde_json::from_str(r#"{"ID":7,"username":"alice"}"#).unwrap();
        assert_eq!(u.id, UserId(7));
        assert_eq!(u.initial(), 'A');
        let u: User = serde_json::from_str(r#"{"id":8,"username":""}"#).unwrap();
        assert_eq!(u.initial(), 'U');
    }

    #[test]
    fn profile_with_unset_fields() {
        let p: Profile = serde_json::from_str(
            r#"{
                "username": "alice",
                "email": "a@example.org",
                "avatar": null,
                "gender": null,
                "phone": null,
                "qq": null,
                "bio": null,
                "is_phone_public": null,
                "is_email_public": true
            }"#,
        )
        .unwrap();
        assert_eq!(p.username, "alice");
        assert_eq!(p.phone, "");
        assert_eq!(p.avatar, "");
        assert_eq!(p.gender, Gender::Unspecified);
        assert!(!p.is_phone_public);
        assert!(p.is_email_public);
        assert_eq!(p.wechat, "");
    }

    #[test]
    fn profile_update_is_flat() {
        let p = Profile {
            gender: Gender::Female,
            bio: String::from("hi"),
            is_qq_public: true,
            ..Profile::default()
        };
        let v = serde_json::to_value(ProfileUpdate::from(&p)).unwrap();
        assert_eq!(v["gender"], 2);
        assert_eq!(v["bio"], "hi");
        assert_eq!(v["is_qq_public"], true);
        assert!(v.get("privacy").is_none());
    }
}
