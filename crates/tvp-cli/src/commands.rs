//! Subcommand implementations. Each builds an analysis request from its
//! flags and hands the response to the renderer.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value as JsonValue;
use tracing::{info, info_span};
use tvp_cli::dataset::{date_range, ingest_options, load_dataset};
use tvp_engine::{
    AggFunc, Analysis, AnalysisRequest, AnalysisResponse, COUNT_COLUMN, Categories, Normalize,
    OrderSpec, Output, Predicate, Preparation, Presentation, execute, execute_batch,
    group_aggregate, prepare,
};
use tvp_geo::{Boundaries, default_location_column, find_location_columns, join_choropleth};
use tvp_model::{Axis, CanonicalOrder, Table, Value, Warning};
use tvp_quality::{QualityRules, key_metrics, summarize};
use tvp_report::{
    matrix_to_json, table_to_json, write_matrix_csv_file, write_table_csv_file,
};

use crate::cli::{
    BreakdownArgs, ColumnsArgs, CorrArgs, CountsArgs, DataArgs, GroupArgs, MapArgs, OutputArgs,
    PivotArgs, PresentArgs, QualityArgs, RunArgs,
};
use crate::render;

/// A loaded dataset and the preparation its flags describe.
struct Dataset {
    table: Table,
    preparation: Preparation,
    warnings: Vec<Warning>,
}

fn load(data: &DataArgs) -> Result<Dataset> {
    let (table, warnings) = load_dataset(&data.input, &ingest_options(&data.declare))?.into_parts();
    let range = date_range(&table, data.date_column.as_deref(), data.from, data.to)?;
    let filter = match data.filter.as_slice() {
        [] => None,
        [single] => Some(single.clone()),
        many => Some(Predicate::All {
            predicates: many.to_vec(),
        }),
    };
    Ok(Dataset {
        table,
        preparation: Preparation {
            date_range: range,
            buckets: data.derive.clone(),
            filter,
        },
        warnings,
    })
}

fn report_load_warnings(warnings: &[Warning]) {
    let failed: usize = warnings
        .iter()
        .map(|warning| match warning {
            Warning::CoercionFailed { failed, .. } => *failed,
            _ => 0,
        })
        .sum();
    if failed > 0 {
        eprintln!("warning: {failed} cell(s) could not be read with their column type and are treated as missing");
    }
}

fn canonical_order(order: Option<CanonicalOrder>, axis: Option<Axis>) -> Option<OrderSpec> {
    order.map(|order| OrderSpec {
        dimension: None,
        axis,
        categories: Categories::Named(order),
        fill: Value::Number(0.0),
    })
}

fn presentation(args: &PresentArgs) -> Presentation {
    Presentation {
        sort_by: args.sort.clone(),
        descending: args.descending,
        limit: args.limit,
    }
}

fn emit(response: &AnalysisResponse, output: &OutputArgs) -> Result<()> {
    match &response.output {
        Output::Table(table) => {
            if let Some(path) = &output.csv {
                write_table_csv_file(table, path)?;
            }
            if output.json {
                println!("{}", serde_json::to_string_pretty(&table_to_json(table)?)?);
            } else {
                render::print_table(table)?;
            }
        }
        Output::Matrix(matrix) => {
            if let Some(path) = &output.csv {
                write_matrix_csv_file(matrix, path)?;
            }
            if output.json {
                println!("{}", serde_json::to_string_pretty(&matrix_to_json(matrix)?)?);
            } else {
                render::print_matrix(matrix);
            }
        }
        Output::Empty => {}
    }
    render::print_warnings(&response.warnings);
    Ok(())
}

fn run_request(data: &DataArgs, request: AnalysisRequest, output: &OutputArgs) -> Result<()> {
    let dataset = load(data)?;
    report_load_warnings(&dataset.warnings);
    let request = AnalysisRequest {
        prepare: dataset.preparation,
        ..request
    };
    let response = execute(&dataset.table, &request)
        .with_context(|| format!("{} analysis failed", request.analysis.kind()))?;
    emit(&response, output)
}

pub fn run_columns(args: &ColumnsArgs) -> Result<()> {
    run_request(&args.data, AnalysisRequest::new(Analysis::Describe), &args.output)
}

pub fn run_quality(args: &QualityArgs) -> Result<()> {
    let rules = match &args.rules {
        Some(path) => QualityRules::load(path)?,
        None => QualityRules::default(),
    };
    let dataset = load(&args.data)?;
    report_load_warnings(&dataset.warnings);
    let (table, warnings) = prepare(&dataset.table, &dataset.preparation)?.into_parts();
    let _span = info_span!("quality", rows = table.height()).entered();
    let report = summarize(&table, &rules).context("quality summary failed")?;
    let metrics = key_metrics(&table)?;
    if args.json {
        let json = serde_json::json!({ "metrics": metrics, "report": report });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        render::print_quality(&report, &metrics);
    }
    render::print_warnings(&warnings);
    Ok(())
}

pub fn run_group(args: &GroupArgs) -> Result<()> {
    let request = AnalysisRequest {
        order: canonical_order(args.present.order, None),
        present: presentation(&args.present),
        ..AnalysisRequest::new(Analysis::Group {
            group_by: args.by.clone(),
            measures: args.measures.clone(),
            functions: args.functions.clone(),
        })
    };
    run_request(&args.data, request, &args.output)
}

pub fn run_pivot(args: &PivotArgs) -> Result<()> {
    let analysis = match (&args.values, args.function) {
        (None, _) => Analysis::Crosstab {
            index: args.index.clone(),
            columns: args.columns.clone(),
            normalize: if args.normalize {
                Normalize::Index
            } else {
                Normalize::None
            },
        },
        (Some(values), None) => Analysis::Pivot {
            index: args.index.clone(),
            columns: args.columns.clone(),
            values: values.clone(),
            fill: Value::Number(0.0),
        },
        (Some(values), Some(function)) => Analysis::PivotTable {
            index: args.index.clone(),
            columns: args.columns.clone(),
            values: values.clone(),
            function,
            fill: Value::Number(0.0),
        },
    };
    let request = AnalysisRequest {
        order: canonical_order(args.order, Some(Axis::Rows)),
        ..AnalysisRequest::new(analysis)
    };
    run_request(&args.data, request, &args.output)
}

pub fn run_breakdown(args: &BreakdownArgs) -> Result<()> {
    let analysis = match &args.columns {
        None => Analysis::Breakdown {
            group_by: args.by.clone(),
            flag: args.flag.clone(),
        },
        Some(columns) => Analysis::Heatmap {
            index: args.by.clone(),
            columns: columns.clone(),
            flag: args.flag.clone(),
        },
    };
    let axis = args.columns.as_ref().map(|_| Axis::Rows);
    let request = AnalysisRequest {
        order: canonical_order(args.present.order, axis),
        present: presentation(&args.present),
        ..AnalysisRequest::new(analysis)
    };
    run_request(&args.data, request, &args.output)
}

pub fn run_counts(args: &CountsArgs) -> Result<()> {
    let request = AnalysisRequest {
        present: Presentation {
            limit: args.top,
            ..Presentation::default()
        },
        ..AnalysisRequest::new(Analysis::ValueCounts {
            column: args.column.clone(),
        })
    };
    run_request(&args.data, request, &args.output)
}

pub fn run_corr(args: &CorrArgs) -> Result<()> {
    let request = AnalysisRequest::new(Analysis::Correlation {
        columns: args.columns.clone(),
    });
    run_request(&args.data, request, &args.output)
}

/// Reads one request object or an array of them.
pub fn read_requests(path: &Path) -> Result<Vec<AnalysisRequest>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let json: JsonValue = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let requests = match json {
        JsonValue::Array(_) => serde_json::from_value(json)?,
        single => vec![serde_json::from_value(single)?],
    };
    Ok(requests)
}

pub fn run_requests(args: &RunArgs) -> Result<()> {
    let requests = read_requests(&args.request)
        .with_context(|| format!("invalid request file {}", args.request.display()))?;
    let dataset = load(&args.data)?;
    report_load_warnings(&dataset.warnings);
    let requests: Vec<AnalysisRequest> = requests
        .into_iter()
        .map(|mut request| {
            if request.prepare == Preparation::default() {
                request.prepare = dataset.preparation.clone();
            }
            request
        })
        .collect();
    let output = OutputArgs {
        csv: None,
        json: args.json,
    };
    let total = requests.len();
    let mut failed = 0usize;
    for (request, result) in requests.iter().zip(execute_batch(&dataset.table, &requests)) {
        println!("== {} ==", request.analysis.kind());
        match result {
            Ok(response) => emit(&response, &output)?,
            Err(error) => {
                failed += 1;
                eprintln!("error: {error}");
                if let Some(hint) = error.suggestion() {
                    eprintln!("hint: {hint}");
                }
            }
        }
    }
    info!(total, failed, "requests executed");
    if failed > 0 {
        bail!("{failed} of {total} request(s) failed");
    }
    Ok(())
}

pub fn run_map(args: &MapArgs) -> Result<()> {
    let boundaries = Boundaries::from_path(&args.boundaries, args.property.as_deref())?;
    let dataset = load(&args.data)?;
    report_load_warnings(&dataset.warnings);
    let (table, warnings) = prepare(&dataset.table, &dataset.preparation)?.into_parts();

    let location = match &args.location {
        Some(column) => column.clone(),
        None => {
            let candidates = find_location_columns(&table, &boundaries)?;
            default_location_column(&candidates)
                .map(str::to_string)
                .context("no location column found; pass --location")?
        }
    };
    let (grouped, value_column) = match &args.value {
        Some(value) => {
            let function = AggFunc::from(args.function);
            (
                group_aggregate(&table, &[location.as_str()], &[value.as_str()], &[function])?,
                function.output_name(value),
            )
        }
        None => (
            group_aggregate::<_, &str>(&table, &[location.as_str()], &[], &[AggFunc::Count])?,
            COUNT_COLUMN.to_string(),
        ),
    };
    let layer = join_choropleth(&grouped, &location, &value_column, &boundaries)?;

    let output = &args.output;
    if let Some(path) = &output.csv {
        write_table_csv_file(&layer.to_table()?, path)?;
    }
    if output.json {
        println!("{}", serde_json::to_string_pretty(&layer)?);
    } else {
        render::print_layer(&layer);
    }
    render::print_warnings(&warnings);
    Ok(())
}
