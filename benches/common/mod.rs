#![allow(dead_code)]
use std::fs;

use toyc::ast::Program;
use toyc::parser;

pub struct Workload {
    pub label: &'static str,
    pub source: String,
    pub input: &'static str,
}

pub fn load_source(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("read {path}: {err}"))
}

pub fn load_program(source: &str) -> Program {
    parser::parse(source).unwrap_or_else(|err| panic!("parse: {err}"))
}

/// Straight-line code with many assignments and branches.
fn long_source() -> String {
    let mut source = String::from("total = 0;\n");
    for i in 0..200 {
        source.push_str(&format!(
            "x{i} = {i} * 2 - (total / 3);\nif x{i} >= total then total = total + x{i} else total = total - 1;\n"
        ));
    }
    source.push_str("wr total;\n");
    source
}

const LOOP_SOURCE: &str = "
i = 0;
s = 0;
while i < 20000 do begin
    s = s + i * 0.5;
    if s > 1000000 then s = s - 1000000;
    i = i + 1;
end;
wr s;
";

pub fn workloads() -> Vec<Workload> {
    vec![
        Workload {
            label: "factorial",
            source: load_source("tests/programs/factorial/program.toy"),
            input: "10",
        },
        Workload {
            label: "long",
            source: long_source(),
            input: "",
        },
        Workload {
            label: "loop",
            source: LOOP_SOURCE.to_string(),
            input: "",
        },
    ]
}
