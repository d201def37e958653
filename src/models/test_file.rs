//! Result file and file header records.

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use super::wire_time;

/// Origin tag for files produced by the Robot Framework importer, the
/// overwhelmingly common caller.
pub const DEFAULT_FILE_ORIGIN: &str = "ROBFW";

/// A new log/execution file belonging to one result.
///
/// The backend assigns the integer id returned by `create_file`.
#[derive(Debug, Clone, Serialize)]
pub struct NewTestFile {
    /// Result this file belongs to
    #[serde(rename = "test_result_id")]
    pub result_id: Uuid,
    pub name: String,
    pub tester_account: String,
    pub tester_machine: String,
    #[serde(with = "wire_time")]
    pub time_start: NaiveDateTime,
    #[serde(with = "wire_time")]
    pub time_end: NaiveDateTime,
    /// Test framework that produced the file, see [`DEFAULT_FILE_ORIGIN`]
    pub origin: String,
}

/// Header block describing tool and environment configuration for one file.
///
/// Write-once, one-to-one with a file. The field set mirrors the webapp's
/// header table column for column, which is why it is this wide; the names
/// are the wire names.
#[derive(Debug, Clone, Serialize)]
pub struct NewFileHeader {
    pub file_id: i64,

    pub testtoolconfiguration_testtoolname: String,
    pub testtoolconfiguration_testtoolversionstring: String,
    pub testtoolconfiguration_projectname: String,
    pub testtoolconfiguration_logfileencoding: String,
    pub testtoolconfiguration_pythonversion: String,
    pub testtoolconfiguration_testfile: String,
    pub testtoolconfiguration_logfilepath: String,
    pub testtoolconfiguration_logfilemode: String,
    pub testtoolconfiguration_ctrlfilepath: String,
    pub testtoolconfiguration_configfile: String,
    pub testtoolconfiguration_confname: String,

    pub testfileheader_author: String,
    pub testfileheader_project: String,
    pub testfileheader_testfiledate: String,
    pub testfileheader_version_major: String,
    pub testfileheader_version_minor: String,
    pub testfileheader_version_patch: String,
    pub testfileheader_keyword: String,
    pub testfileheader_shortdescription: String,

    pub testexecution_useraccount: String,
    pub testexecution_computername: String,

    pub testrequirements_documentmanagement: String,
    pub testrequirements_testenvironment: String,

    pub testbenchconfig_name: String,
    pub testbenchconfig_data: String,

    pub preprocessor_filter: String,
    pub preprocessor_parameters: String,
}
