//! Parameterized SQL for the direct strategy.
//!
//! Table and column names follow the webapp's resource naming; the schema
//! itself belongs to the webapp. Everything is bound, nothing interpolated.

use sea_orm::{DatabaseBackend, Statement};

use crate::models::{
    CcrSample, NewAbortReason, NewFileHeader, NewTestCase, NewTestFile, NewTestResult, ResultState,
};
use uuid::Uuid;

const BACKEND: DatabaseBackend = DatabaseBackend::MySql;

pub fn select_project(project: &str, variant: &str, branch: &str) -> Statement {
    Statement::from_sql_and_values(
        BACKEND,
        "SELECT project FROM projects WHERE project = ? AND variant = ? AND branch = ?",
        [project.into(), variant.into(), branch.into()],
    )
}

pub fn insert_project(project: &str, variant: &str, branch: &str) -> Statement {
    Statement::from_sql_and_values(
        BACKEND,
        "INSERT INTO projects (project, variant, branch) VALUES (?, ?, ?)",
        [project.into(), variant.into(), branch.into()],
    )
}

pub fn insert_result(result: &NewTestResult, state: ResultState) -> Statement {
    Statement::from_sql_and_values(
        BACKEND,
        "INSERT INTO results (test_result_id, project, variant, branch, \
         time_start, time_end, version_sw_target, version_sw_test, \
         version_hardware, jenkinsurl, reporting_qualitygate, interpretation, \
         result_state) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        [
            result.result_id.to_string().into(),
            result.project.as_str().into(),
            result.variant.as_str().into(),
            result.branch.as_str().into(),
            result.time_start.into(),
            result.time_end.into(),
            result.version_sw_target.as_str().into(),
            result.version_sw_test.as_str().into(),
            result.version_hardware.as_str().into(),
            result.build_url.as_str().into(),
            result.qualitygate.as_str().into(),
            result.interpretation.as_str().into(),
            state.as_str().into(),
        ],
    )
}

pub fn select_result(result_id: Uuid) -> Statement {
    Statement::from_sql_and_values(
        BACKEND,
        "SELECT project, version_sw_target FROM results WHERE test_result_id = ?",
        [result_id.to_string().into()],
    )
}

pub fn insert_file(file: &NewTestFile) -> Statement {
    Statement::from_sql_and_values(
        BACKEND,
        "INSERT INTO files (test_result_id, name, tester_account, tester_machine, \
         time_start, time_end, origin) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        [
            file.result_id.to_string().into(),
            file.name.as_str().into(),
            file.tester_account.as_str().into(),
            file.tester_machine.as_str().into(),
            file.time_start.into(),
            file.time_end.into(),
            file.origin.as_str().into(),
        ],
    )
}

pub fn select_latest_file_id(result_id: Option<Uuid>) -> Statement {
    match result_id {
        Some(id) => Statement::from_sql_and_values(
            BACKEND,
            "SELECT id FROM files WHERE test_result_id = ? ORDER BY id DESC LIMIT 1",
            [id.to_string().into()],
        ),
        None => Statement::from_string(
            BACKEND,
            "SELECT id FROM files ORDER BY id DESC LIMIT 1".to_owned(),
        ),
    }
}

pub fn insert_file_header(header: &NewFileHeader) -> Statement {
    Statement::from_sql_and_values(
        BACKEND,
        "INSERT INTO fileheaders (file_id, \
         testtoolconfiguration_testtoolname, testtoolconfiguration_testtoolversionstring, \
         testtoolconfiguration_projectname, testtoolconfiguration_logfileencoding, \
         testtoolconfiguration_pythonversion, testtoolconfiguration_testfile, \
         testtoolconfiguration_logfilepath, testtoolconfiguration_logfilemode, \
         testtoolconfiguration_ctrlfilepath, testtoolconfiguration_configfile, \
         testtoolconfiguration_confname, \
         testfileheader_author, testfileheader_project, testfileheader_testfiledate, \
         testfileheader_version_major, testfileheader_version_minor, \
         testfileheader_version_patch, testfileheader_keyword, \
         testfileheader_shortdescription, \
         testexecution_useraccount, testexecution_computername, \
         testrequirements_documentmanagement, testrequirements_testenvironment, \
         testbenchconfig_name, testbenchconfig_data, \
         preprocessor_filter, preprocessor_parameters) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        [
            header.file_id.into(),
            header.testtoolconfiguration_testtoolname.as_str().into(),
            header
                .testtoolconfiguration_testtoolversionstring
                .as_str()
                .into(),
            header.testtoolconfiguration_projectname.as_str().into(),
            header.testtoolconfiguration_logfileencoding.as_str().into(),
            header.testtoolconfiguration_pythonversion.as_str().into(),
            header.testtoolconfiguration_testfile.as_str().into(),
            header.testtoolconfiguration_logfilepath.as_str().into(),
            header.testtoolconfiguration_logfilemode.as_str().into(),
            header.testtoolconfiguration_ctrlfilepath.as_str().into(),
            header.testtoolconfiguration_configfile.as_str().into(),
            header.testtoolconfiguration_confname.as_str().into(),
            header.testfileheader_author.as_str().into(),
            header.testfileheader_project.as_str().into(),
            header.testfileheader_testfiledate.as_str().into(),
            header.testfileheader_version_major.as_str().into(),
            header.testfileheader_version_minor.as_str().into(),
            header.testfileheader_version_patch.as_str().into(),
            header.testfileheader_keyword.as_str().into(),
            header.testfileheader_shortdescription.as_str().into(),
            header.testexecution_useraccount.as_str().into(),
            header.testexecution_computername.as_str().into(),
            header.testrequirements_documentmanagement.as_str().into(),
            header.testrequirements_testenvironment.as_str().into(),
            header.testbenchconfig_name.as_str().into(),
            header.testbenchconfig_data.as_str().into(),
            header.preprocessor_filter.as_str().into(),
            header.preprocessor_parameters.as_str().into(),
        ],
    )
}

pub fn insert_test_case(case: &NewTestCase) -> Statement {
    Statement::from_sql_and_values(
        BACKEND,
        "INSERT INTO testcases (name, issue, tcid, fid, component, time_start, \
         result_main, result_state, result_return, counter_resets, lastlog, \
         testnumber, repeatcount, test_result_id, file_id) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        [
            case.name.as_str().into(),
            case.issue.as_str().into(),
            case.tcid.as_str().into(),
            case.fid.as_str().into(),
            case.component.as_str().into(),
            case.time_start.into(),
            case.result_main.as_str().into(),
            case.result_state.as_str().into(),
            case.result_return.into(),
            case.counter_resets.into(),
            case.lastlog.as_str().into(),
            case.test_number.to_string().into(),
            case.repeat_count.to_string().into(),
            case.result_id.to_string().into(),
            case.file_id.into(),
        ],
    )
}

pub fn insert_abort(abort: &NewAbortReason) -> Statement {
    Statement::from_sql_and_values(
        BACKEND,
        "INSERT INTO aborts (test_result_id, abort_reason, msg_detail) VALUES (?, ?, ?)",
        [
            abort.result_id.to_string().into(),
            abort.reason.as_str().into(),
            abort.message.as_str().into(),
        ],
    )
}

pub fn insert_ccr(test_case_id: i64, sample: &CcrSample) -> Statement {
    Statement::from_sql_and_values(
        BACKEND,
        "INSERT INTO ccrs (test_case_id, timestamp, MEM_RSS, CPU) VALUES (?, ?, ?, ?)",
        [
            test_case_id.into(),
            sample.timestamp.into(),
            sample.mem_rss.into(),
            sample.cpu.into(),
        ],
    )
}

pub fn insert_tags(result_id: Uuid, tags: &str) -> Statement {
    Statement::from_sql_and_values(
        BACKEND,
        "INSERT INTO userresults (test_result_id, tags) VALUES (?, ?)",
        [result_id.to_string().into(), tags.into()],
    )
}

pub fn select_categories() -> Statement {
    Statement::from_string(BACKEND, "SELECT category FROM categories".to_owned())
}

pub fn update_reanimation(result_id: Uuid, count: i64) -> Statement {
    Statement::from_sql_and_values(
        BACKEND,
        "UPDATE results SET num_of_reanimation = ? WHERE test_result_id = ?",
        [count.into(), result_id.to_string().into()],
    )
}

pub fn update_category(result_id: Uuid, category: &str) -> Statement {
    Statement::from_sql_and_values(
        BACKEND,
        "UPDATE results SET category_main = ? WHERE test_result_id = ?",
        [category.into(), result_id.to_string().into()],
    )
}

pub fn update_file_end_time(file_id: i64, time_end: chrono::NaiveDateTime) -> Statement {
    Statement::from_sql_and_values(
        BACKEND,
        "UPDATE files SET time_end = ? WHERE id = ?",
        [time_end.into(), file_id.into()],
    )
}

pub fn update_result_end_time(result_id: Uuid, time_end: chrono::NaiveDateTime) -> Statement {
    Statement::from_sql_and_values(
        BACKEND,
        "UPDATE results SET time_end = ? WHERE test_result_id = ?",
        [time_end.into(), result_id.to_string().into()],
    )
}

pub fn update_result_state(result_id: Uuid, state: ResultState) -> Statement {
    Statement::from_sql_and_values(
        BACKEND,
        "UPDATE results SET result_state = ? WHERE test_result_id = ?",
        [state.as_str().into(), result_id.to_string().into()],
    )
}

pub fn call_update_evtbl(result_id: Uuid) -> Statement {
    Statement::from_sql_and_values(
        BACKEND,
        "CALL update_evtbl(?)",
        [result_id.to_string().into()],
    )
}

pub fn call_update_evtbls() -> Statement {
    Statement::from_string(BACKEND, "CALL update_evtbls()".to_owned())
}
