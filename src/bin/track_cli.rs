#[cfg(target_arch = "wasm32")]
fn main() {
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("track_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fmt::Write as _;
    use std::fs::{self, File};
    use std::io::{BufWriter, Write};
    use std::path::{Path, PathBuf};

    use track_engine::geom::{Mesh, MeshDiagnostics, RailCurve, ResolutionPolicy};
    use track_engine::{TrackConfig, TrackGeometry, TrackPath, generate};

    const SNAPSHOT_QUANTIZE: f64 = 1e-6;
    const SNAPSHOT_DECIMALS: usize = 6;

    const USAGE: &str = r#"track_cli (track-engine)

USAGE:
  track_cli list
  track_cli run <scenario|all> [options]
  track_cli run <name> --points <file> [options]

SCENARIOS:
  square
  circle
  hill_loop

OPTIONS (run):
  --points <file>    Read the centerline from a whitespace separated `x y z` file;
                     <name> only labels the output
  --width <w>        Track width (default 1.0)
  --density <n>      Samples per unit of length (default 2.0)
  --out-dir <dir>    Write <name>.obj and/or <name>.snap to this dir (required for `all`)
  --obj <path>       Write OBJ (single track only)
  --snap <path>      Write snapshot (single track only)
  --no-obj           Skip OBJ when using --out-dir
  --no-snap          Skip snapshot when using --out-dir
  --overwrite        Overwrite existing output files
  -h, --help         Show this help
"#;

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "list" => {
                print_scenarios();
                Ok(())
            }
            "run" => cmd_run(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn print_scenarios() {
        for scenario in Scenario::ALL {
            println!("{}", scenario.name());
        }
    }

    struct Outputs {
        out_dir: Option<PathBuf>,
        obj_path: Option<PathBuf>,
        snap_path: Option<PathBuf>,
        overwrite: bool,
        write_obj: bool,
        write_snap: bool,
    }

    fn cmd_run(args: &mut Args) -> Result<(), String> {
        let name = args.next().ok_or("missing scenario name")?;

        let mut outputs = Outputs {
            out_dir: None,
            obj_path: None,
            snap_path: None,
            overwrite: false,
            write_obj: true,
            write_snap: true,
        };
        let mut points_path: Option<PathBuf> = None;
        let mut config = TrackConfig::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--points" => points_path = Some(PathBuf::from(args.value("--points")?)),
                "--width" => config = config.with_track_width(args.number("--width")?),
                "--density" => {
                    let density = args.number("--density")?;
                    config = config.with_resolution(ResolutionPolicy::new(density));
                }
                "--out-dir" => outputs.out_dir = Some(PathBuf::from(args.value("--out-dir")?)),
                "--obj" => outputs.obj_path = Some(PathBuf::from(args.value("--obj")?)),
                "--snap" => outputs.snap_path = Some(PathBuf::from(args.value("--snap")?)),
                "--overwrite" => outputs.overwrite = true,
                "--no-obj" => outputs.write_obj = false,
                "--no-snap" => outputs.write_snap = false,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        config.validate().map_err(|e| e.to_string())?;

        if let Some(dir) = outputs.out_dir.as_ref() {
            if outputs.obj_path.is_some() || outputs.snap_path.is_some() {
                return Err("use either --out-dir or --obj/--snap (not both)".to_string());
            }
            if !outputs.write_obj && !outputs.write_snap {
                return Err("nothing to write (both --no-obj and --no-snap set)".to_string());
            }
            fs::create_dir_all(dir).map_err(|e| format!("create out dir: {e}"))?;
        }

        if let Some(path) = points_path.as_deref() {
            if name == "all" {
                return Err("`all` cannot be combined with --points".to_string());
            }
            let track = read_points_file(path)?;
            return run_track(&name, &track, &config, &outputs);
        }

        if name == "all" {
            if outputs.out_dir.is_none() {
                return Err("`run all` requires --out-dir".to_string());
            }
            for scenario in Scenario::ALL {
                run_track(scenario.name(), &scenario.path()?, &config, &outputs)?;
            }
            return Ok(());
        }

        let scenario = Scenario::from_str(name.as_str()).ok_or_else(|| unknown_scenario(&name))?;
        run_track(scenario.name(), &scenario.path()?, &config, &outputs)
    }

    fn run_track(
        name: &str,
        path: &TrackPath,
        config: &TrackConfig,
        outputs: &Outputs,
    ) -> Result<(), String> {
        let geometry = generate(path, config).map_err(|e| format!("{name}: {e}"))?;
        let snap = snapshot(name, &geometry);

        if let Some(dir) = outputs.out_dir.as_deref() {
            if outputs.write_snap {
                let path = dir.join(format!("{name}.snap"));
                write_text_file(&path, &snap, outputs.overwrite)?;
                eprintln!("wrote {}", path.display());
            }
            if outputs.write_obj {
                let path = dir.join(format!("{name}.obj"));
                write_obj_file(&path, &geometry, outputs.overwrite)?;
                eprintln!("wrote {}", path.display());
            }
        } else {
            if let Some(path) = outputs.snap_path.as_deref() {
                write_text_file(path, &snap, outputs.overwrite)?;
                eprintln!("wrote {}", path.display());
            } else {
                print!("{snap}");
            }
            if let Some(path) = outputs.obj_path.as_deref() {
                write_obj_file(path, &geometry, outputs.overwrite)?;
                eprintln!("wrote {}", path.display());
            }
        }

        eprintln!(
            "{name}: steps={} length={:.4} | {}",
            geometry.steps,
            geometry.total_length,
            geometry.diagnostics.summary()
        );
        Ok(())
    }

    fn unknown_scenario(name: &str) -> String {
        let mut msg = String::new();
        let _ = writeln!(msg, "unknown scenario `{name}`\n\navailable scenarios:");
        for scenario in Scenario::ALL {
            let _ = writeln!(msg, "  {}", scenario.name());
        }
        msg
    }

    /// One point per non-empty line; `#` starts a comment.
    fn read_points_file(path: &Path) -> Result<TrackPath, String> {
        let text = fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))?;
        let mut coords = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let values = line
                .split_whitespace()
                .map(str::parse::<f64>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| format!("{}:{}: {e}", path.display(), line_no + 1))?;
            if values.len() != 3 {
                return Err(format!(
                    "{}:{}: expected `x y z`, got {} values",
                    path.display(),
                    line_no + 1,
                    values.len()
                ));
            }
            coords.push([values[0], values[1], values[2]]);
        }
        TrackPath::from_arrays(&coords).map_err(|e| format!("{}: {e}", path.display()))
    }

    fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        fs::write(path, normalize_snapshot_text(text))
            .map_err(|e| format!("write {}: {e}", path.display()))
    }

    #[derive(Default)]
    struct ObjOffsets {
        v: usize,
        vt: usize,
        vn: usize,
    }

    fn write_obj_file(
        path: &Path,
        geometry: &TrackGeometry,
        overwrite: bool,
    ) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }

        let file = File::create(path).map_err(|e| format!("create {}: {e}", path.display()))?;
        let mut w = BufWriter::new(file);

        writeln!(w, "# track-engine track_cli").map_err(|e| format!("write obj: {e}"))?;
        let mut offsets = ObjOffsets::default();
        for (name, mesh) in [
            ("ribbon", &geometry.ribbon),
            ("left_rail", &geometry.left_rail),
            ("right_rail", &geometry.right_rail),
        ] {
            write_obj_object(&mut w, name, mesh, &mut offsets)
                .map_err(|e| format!("write obj: {e}"))?;
        }

        w.flush().map_err(|e| format!("flush {}: {e}", path.display()))
    }

    fn write_obj_object(
        w: &mut dyn Write,
        name: &str,
        mesh: &Mesh,
        offsets: &mut ObjOffsets,
    ) -> std::io::Result<()> {
        writeln!(w, "o {name}")?;

        for p in mesh.positions.iter().copied() {
            writeln!(w, "v {} {} {}", p[0], p[1], p[2])?;
        }
        if let Some(uvs) = mesh.uvs.as_ref() {
            for uv in uvs.iter().copied() {
                writeln!(w, "vt {} {}", uv[0], uv[1])?;
            }
        }
        if let Some(normals) = mesh.normals.as_ref() {
            for n in normals.iter().copied() {
                writeln!(w, "vn {} {} {}", n[0], n[1], n[2])?;
            }
        }

        let has_uvs = mesh.uvs.is_some();
        let has_normals = mesh.normals.is_some();
        let face = |w: &mut dyn Write, tri: &[u32]| -> std::io::Result<()> {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize + 1);
            let [va, vb, vc] = [a, b, c].map(|i| i + offsets.v);
            let [ta, tb, tc] = [a, b, c].map(|i| i + offsets.vt);
            let [na, nb, nc] = [a, b, c].map(|i| i + offsets.vn);
            match (has_uvs, has_normals) {
                (true, true) => writeln!(w, "f {va}/{ta}/{na} {vb}/{tb}/{nb} {vc}/{tc}/{nc}"),
                (true, false) => writeln!(w, "f {va}/{ta} {vb}/{tb} {vc}/{tc}"),
                (false, true) => writeln!(w, "f {va}//{na} {vb}//{nb} {vc}//{nc}"),
                (false, false) => writeln!(w, "f {va} {vb} {vc}"),
            }
        };

        if mesh.groups.is_empty() {
            for tri in mesh.indices.chunks_exact(3) {
                face(&mut *w, tri)?;
            }
        } else {
            for group in &mesh.groups {
                writeln!(w, "usemtl lane_{}", group.material_index)?;
                let range = group.start..group.end().min(mesh.indices.len());
                for tri in mesh.indices[range].chunks_exact(3) {
                    face(&mut *w, tri)?;
                }
            }
        }

        offsets.v += mesh.positions.len();
        offsets.vt += mesh.uvs.as_ref().map_or(0, Vec::len);
        offsets.vn += mesh.normals.as_ref().map_or(0, Vec::len);
        Ok(())
    }

    fn normalize_snapshot_text(text: &str) -> String {
        let normalized = text.replace("\r\n", "\n");
        if normalized.ends_with('\n') {
            normalized
        } else {
            format!("{normalized}\n")
        }
    }

    fn quantize_f64(value: f64) -> f64 {
        if !value.is_finite() {
            return value;
        }
        let value = if value == -0.0 { 0.0 } else { value };
        let q = (value / SNAPSHOT_QUANTIZE).round() * SNAPSHOT_QUANTIZE;
        if q == -0.0 { 0.0 } else { q }
    }

    fn write_f64(out: &mut String, value: f64) {
        let value = quantize_f64(value);
        let _ = write!(out, "{value:.SNAPSHOT_DECIMALS$}");
    }

    fn write_vec3_line(out: &mut String, prefix: &str, v: [f64; 3]) {
        let _ = write!(out, "{prefix} ");
        write_f64(out, v[0]);
        out.push(' ');
        write_f64(out, v[1]);
        out.push(' ');
        write_f64(out, v[2]);
        out.push('\n');
    }

    fn write_vec2_line(out: &mut String, prefix: &str, v: [f64; 2]) {
        let _ = write!(out, "{prefix} ");
        write_f64(out, v[0]);
        out.push(' ');
        write_f64(out, v[1]);
        out.push('\n');
    }

    fn write_mesh_diagnostics(out: &mut String, label: &str, diag: &MeshDiagnostics) {
        let _ = writeln!(out, "{label}_diag.vertex_count {}", diag.vertex_count);
        let _ = writeln!(out, "{label}_diag.triangle_count {}", diag.triangle_count);
        let _ = writeln!(
            out,
            "{label}_diag.degenerate_triangle_count {}",
            diag.degenerate_triangle_count
        );
        let _ = writeln!(out, "{label}_diag.open_edge_count {}", diag.open_edge_count);
        let _ = writeln!(
            out,
            "{label}_diag.non_manifold_edge_count {}",
            diag.non_manifold_edge_count
        );
        let _ = writeln!(out, "{label}_diag.orientation_flipped {}", diag.orientation_flipped);
        let _ = writeln!(out, "{label}_diag.warning_count {}", diag.warnings.len());
        for (idx, warning) in diag.warnings.iter().enumerate() {
            let _ = writeln!(out, "{label}_diag.warning.{idx} {warning}");
        }
    }

    fn write_mesh(out: &mut String, label: &str, mesh: &Mesh) {
        let _ = writeln!(out, "{label}.vertex_count {}", mesh.vertex_count());
        let _ = writeln!(out, "{label}.triangle_count {}", mesh.triangle_count());

        let _ = writeln!(out, "{label}.groups {}", mesh.groups.len());
        for group in &mesh.groups {
            let _ = writeln!(out, "g {} {} {}", group.start, group.count, group.material_index);
        }

        let _ = writeln!(out, "{label}.positions {}", mesh.positions.len());
        for p in mesh.positions.iter().copied() {
            write_vec3_line(out, "p", p);
        }

        let _ = writeln!(out, "{label}.indices {}", mesh.indices.len());
        for tri in mesh.indices.chunks_exact(3) {
            let _ = writeln!(out, "i {} {} {}", tri[0], tri[1], tri[2]);
        }

        if let Some(uvs) = mesh.uvs.as_ref() {
            let _ = writeln!(out, "{label}.uvs {}", uvs.len());
            for uv in uvs.iter().copied() {
                write_vec2_line(out, "uv", uv);
            }
        } else {
            let _ = writeln!(out, "{label}.uvs none");
        }
    }

    fn write_rail_curve(out: &mut String, curve: &RailCurve) {
        let _ = writeln!(out, "{}.column {}", curve.side.name(), curve.column);
        let _ = writeln!(out, "{}.points {}", curve.side.name(), curve.len());
        for p in &curve.points {
            write_vec3_line(out, "r", p.to_array());
        }
    }

    fn snapshot(name: &str, geometry: &TrackGeometry) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# track-engine snapshot v1");
        let _ = writeln!(out, "track {name}");
        let _ = writeln!(out, "quantize {SNAPSHOT_QUANTIZE:.1e}");
        let _ = writeln!(out, "steps {}", geometry.steps);
        let _ = write!(out, "total_length ");
        write_f64(&mut out, geometry.total_length);
        out.push('\n');
        write_vec2_line(
            &mut out,
            "tiling",
            [geometry.tiling.repeat_u, geometry.tiling.repeat_v],
        );

        write_mesh_diagnostics(&mut out, "ribbon", &geometry.diagnostics.ribbon);
        write_mesh_diagnostics(&mut out, "left_rail", &geometry.diagnostics.left_rail);
        write_mesh_diagnostics(&mut out, "right_rail", &geometry.diagnostics.right_rail);

        write_mesh(&mut out, "ribbon", &geometry.ribbon);
        write_rail_curve(&mut out, &geometry.left_rail_curve);
        write_rail_curve(&mut out, &geometry.right_rail_curve);
        write_mesh(&mut out, "left_rail", &geometry.left_rail);
        write_mesh(&mut out, "right_rail", &geometry.right_rail);

        normalize_snapshot_text(&out)
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Scenario {
        Square,
        Circle,
        HillLoop,
    }

    impl Scenario {
        const ALL: &'static [Scenario] = &[Scenario::Square, Scenario::Circle, Scenario::HillLoop];

        fn name(self) -> &'static str {
            match self {
                Scenario::Square => "square",
                Scenario::Circle => "circle",
                Scenario::HillLoop => "hill_loop",
            }
        }

        fn from_str(name: &str) -> Option<Self> {
            match name {
                "square" => Some(Scenario::Square),
                "circle" => Some(Scenario::Circle),
                "hill_loop" => Some(Scenario::HillLoop),
                _ => None,
            }
        }

        #[allow(clippy::cast_precision_loss)]
        fn path(self) -> Result<TrackPath, String> {
            let points: Vec<[f64; 3]> = match self {
                // Perimeter of about 40 units: 80 steps with the default density.
                Scenario::Square => vec![
                    [0.0, 0.0, 0.0],
                    [10.0, 0.0, 0.0],
                    [10.0, 10.0, 0.0],
                    [0.0, 10.0, 0.0],
                ],
                Scenario::Circle => (0..24)
                    .map(|i| {
                        let a = std::f64::consts::TAU * i as f64 / 24.0;
                        [6.0 * a.cos(), 6.0 * a.sin(), 0.0]
                    })
                    .collect(),
                Scenario::HillLoop => (0..16)
                    .map(|i| {
                        let a = std::f64::consts::TAU * i as f64 / 16.0;
                        [12.0 * a.cos(), 7.0 * a.sin(), 1.5 * (2.0 * a).sin()]
                    })
                    .collect(),
            };
            TrackPath::from_arrays(&points).map_err(|e| e.to_string())
        }
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }

        fn number(&mut self, flag: &str) -> Result<f64, String> {
            let raw = self.value(flag)?;
            raw.parse::<f64>()
                .map_err(|e| format!("invalid value `{raw}` for {flag}: {e}"))
        }
    }
}
