//! Fake slicing engines. Each script receives the generated argument list and
//! writes G-code to the path following `--output`.

/// Finds the output path; the last argument is the input model.
macro_rules! engine {
    ($body:literal) => {
        concat!(
            "out=\"\"\n",
            "while [ \"$#\" -gt 1 ]; do\n",
            "  if [ \"$1\" = \"--output\" ]; then out=\"$2\"; fi\n",
            "  shift\n",
            "done\n",
            $body
        )
    };
}

/// Two hours, 120 layers, 2 m of filament.
pub const CUBE: &str = engine!(
    "printf ';generated by fake engine\\n;LAYER_COUNT:120\\n;TIME:7200\\nG1 X10 Y10 E500.5\\nG1 X20 Y20 E2000.0\\n' > \"$out\"\n"
);

/// PrusaSlicer dialect: relative extrusion, `;LAYER_CHANGE` markers and a
/// trailing time estimate. 90 minutes, 3 layers, 600 mm of filament.
pub const PRUSA_STYLE: &str = engine!(
    "printf '; generated by PrusaSlicer 2.7.1\\nM83\\n;LAYER_CHANGE\\n;Z:0.2\\nG1 X10 Y10 E100\\n;LAYER_CHANGE\\n;Z:0.4\\nG1 X20 Y10 E200\\nG1 E-.8\\nG1 E.8\\n;LAYER_CHANGE\\n;Z:0.6\\nG1 X20 Y20 E300\\n; estimated printing time (normal mode) = 1h 30m 0s\\n' > \"$out\"\n"
);

/// Motion only, no time or layer annotations.
pub const NO_MARKERS: &str = engine!(
    "printf 'G28\\nG1 X10 Y10 E300.0\\nG1 X20 Y20 E1000.0\\n' > \"$out\"\n"
);

/// Holds a lock directory while "slicing"; records any overlap.
pub const SERIAL_CHECK: &str = engine!(
    "dir=$(dirname \"$out\")\n\
if ! mkdir \"$dir/engine.lock\" 2>/dev/null; then echo overlap >> \"$dir/engine.log\"; fi\n\
echo start >> \"$dir/engine.log\"\n\
sleep 0.3\n\
printf ';LAYER_COUNT:10\\n;TIME:600\\nG1 X1 E100.0\\n' > \"$out\"\n\
echo end >> \"$dir/engine.log\"\n\
rmdir \"$dir/engine.lock\"\n"
);

/// Exits non-zero with a diagnostic.
pub const CRASHING: &str = engine!("echo 'mesh is not manifold' >&2\nexit 2\n");
