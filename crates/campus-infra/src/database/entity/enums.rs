//! String-backed column enums.

use sea_orm::entity::prelude::*;

use campus_core::domain::{ContentType, Role, ShareMethod, StorageClass};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum DbContentType {
    #[sea_orm(string_value = "text")]
    Text,
    #[sea_orm(string_value = "image")]
    Image,
    #[sea_orm(string_value = "video")]
    Video,
}

impl From<DbContentType> for ContentType {
    fn from(value: DbContentType) -> Self {
        match value {
            DbContentType::Text => ContentType::Text,
            DbContentType::Image => ContentType::Image,
            DbContentType::Video => ContentType::Video,
        }
    }
}

impl From<ContentType> for DbContentType {
    fn from(value: ContentType) -> Self {
        match value {
            ContentType::Text => DbContentType::Text,
            ContentType::Image => DbContentType::Image,
            ContentType::Video => DbContentType::Video,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum DbStorageClass {
    #[sea_orm(string_value = "STANDARD")]
    Standard,
    #[sea_orm(string_value = "NEARLINE")]
    Nearline,
    #[sea_orm(string_value = "COLDLINE")]
    Coldline,
    #[sea_orm(string_value = "ARCHIVE")]
    Archive,
}

impl From<DbStorageClass> for StorageClass {
    fn from(value: DbStorageClass) -> Self {
        match value {
            DbStorageClass::Standard => StorageClass::Standard,
            DbStorageClass::Nearline => StorageClass::Nearline,
            DbStorageClass::Coldline => StorageClass::Coldline,
            DbStorageClass::Archive => StorageClass::Archive,
        }
    }
}

impl From<StorageClass> for DbStorageClass {
    fn from(value: StorageClass) -> Self {
        match value {
            StorageClass::Standard => DbStorageClass::Standard,
            StorageClass::Nearline => DbStorageClass::Nearline,
            StorageClass::Coldline => DbStorageClass::Coldline,
            StorageClass::Archive => DbStorageClass::Archive,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum DbShareMethod {
    #[sea_orm(string_value = "whatsapp")]
    Whatsapp,
    #[sea_orm(string_value = "instagram")]
    Instagram,
    #[sea_orm(string_value = "copy_link")]
    CopyLink,
    #[sea_orm(string_value = "download")]
    Download,
}

impl From<DbShareMethod> for ShareMethod {
    fn from(value: DbShareMethod) -> Self {
        match value {
            DbShareMethod::Whatsapp => ShareMethod::Whatsapp,
            DbShareMethod::Instagram => ShareMethod::Instagram,
            DbShareMethod::CopyLink => ShareMethod::CopyLink,
            DbShareMethod::Download => ShareMethod::Download,
        }
    }
}

impl From<ShareMethod> for DbShareMethod {
    fn from(value: ShareMethod) -> Self {
        match value {
            ShareMethod::Whatsapp => DbShareMethod::Whatsapp,
            ShareMethod::Instagram => DbShareMethod::Instagram,
            ShareMethod::CopyLink => DbShareMethod::CopyLink,
            ShareMethod::Download => DbShareMethod::Download,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum DbRole {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "faculty")]
    Faculty,
    #[sea_orm(string_value = "student")]
    Student,
}

impl From<DbRole> for Role {
    fn from(value: DbRole) -> Self {
        match value {
            DbRole::Admin => Role::Admin,
            DbRole::Faculty => Role::Faculty,
            DbRole::Student => Role::Student,
        }
    }
}
