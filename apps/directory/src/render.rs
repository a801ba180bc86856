//! Plain-text rendering of the directory table and the detail view.

use std::fmt::Write as _;

use client_core::photo_location;
use shared::domain::{display_date, EmployeeSummary, EmployeeWithDetails};

const HEADERS: [&str; 7] = [
    "ID",
    "Name",
    "Department",
    "Position",
    "Hire date",
    "Email",
    "Phone",
];

fn width(text: &str) -> usize {
    text.chars().count()
}

fn pad(text: &str, to: usize) -> String {
    let mut padded = text.to_string();
    padded.extend(std::iter::repeat(' ').take(to.saturating_sub(width(text))));
    padded
}

pub fn table(employees: &[EmployeeSummary]) -> String {
    if employees.is_empty() {
        return "No employees found.\n".to_string();
    }

    let rows: Vec<[String; 7]> = employees
        .iter()
        .map(|e| {
            [
                e.id.to_string(),
                e.name.clone(),
                e.department.clone(),
                e.position.clone(),
                display_date(&e.hire_date),
                e.email.clone(),
                e.phone.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(width);
    for row in &rows {
        for (column, cell) in row.iter().enumerate() {
            widths[column] = widths[column].max(width(cell));
        }
    }

    let mut out = String::new();
    let mut push_line = |cells: Vec<&str>| {
        let line = cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, w)| pad(cell, *w))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    };
    push_line(HEADERS.to_vec());
    for row in &rows {
        push_line(row.iter().map(String::as_str).collect());
    }
    out
}

pub fn detail(employee: &EmployeeWithDetails, api_url: &str) -> String {
    let summary = &employee.summary;
    let details = employee.details.clone().unwrap_or_default();
    let mut out = String::new();

    let photo = employee
        .photo_url()
        .map(|url| photo_location(api_url, url))
        .unwrap_or_else(|| "(no photo)".to_string());

    let mut line = |label: &str, value: &str| {
        let _ = writeln!(out, "{:<18}{value}", format!("{label}:"));
    };
    line("ID", &summary.id.to_string());
    line("Name", &summary.name);
    line("Department", &summary.department);
    line("Position", &summary.position);
    line("Hire date", &display_date(&summary.hire_date));
    line("Email", &summary.email);
    line("Phone", &summary.phone);
    line("Photo", &photo);

    let optional = [
        ("Employment type", details.employment_type.as_deref()),
        ("Manager", details.manager_name.as_deref()),
        ("Birth date", details.birth_date.as_deref()),
        ("Gender", details.gender.as_deref()),
        ("Address", details.address.as_deref()),
        ("Emergency contact", details.emergency_contact.as_deref()),
        ("Notes", details.notes.as_deref()),
    ];
    for (label, value) in optional {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            line(label, value);
        }
    }
    out
}
