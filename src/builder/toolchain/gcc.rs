//! GCC/Clang toolchain implementation.

use std::path::{Path, PathBuf};

use super::{CommandSpec, CompileInput, LinkInput, Toolchain, ToolchainPlatform};

/// GCC/Clang toolchain (Unix-like systems).
#[derive(Debug, Clone)]
pub struct GccToolchain {
    /// Path to the C compiler, also used as the link driver
    pub cc: PathBuf,
    /// Compiler family (gcc, clang, apple-clang)
    pub family: ToolchainPlatform,
}

impl GccToolchain {
    /// Create a new GCC-style toolchain.
    pub fn new(cc: PathBuf, family: ToolchainPlatform) -> Self {
        GccToolchain { cc, family }
    }
}

impl Toolchain for GccToolchain {
    fn platform(&self) -> ToolchainPlatform {
        self.family
    }

    fn compiler_path(&self) -> &Path {
        &self.cc
    }

    fn compile_command(&self, input: &CompileInput) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.cc);

        // Compile only, position independent for a shared module
        cmd = cmd.arg("-c").arg("-fPIC");

        for dir in &input.include_dirs {
            cmd = cmd.arg(format!("-I{}", dir.display()));
        }

        for (name, value) in &input.defines {
            match value {
                Some(v) => cmd = cmd.arg(format!("-D{}={}", name, v)),
                None => cmd = cmd.arg(format!("-D{}", name)),
            }
        }

        cmd = cmd.args(input.cflags.iter().cloned());

        cmd = cmd.arg(input.source.display().to_string());
        cmd = cmd.arg("-o");
        cmd = cmd.arg(input.output.display().to_string());

        cmd
    }

    fn link_module_command(&self, input: &LinkInput) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.cc);

        // Interpreter symbols are resolved when the module is loaded
        if self.family == ToolchainPlatform::AppleClang {
            cmd = cmd.args(["-bundle", "-undefined", "dynamic_lookup"]);
        } else {
            cmd = cmd.arg("-shared");
        }

        cmd = cmd.arg("-o");
        cmd = cmd.arg(input.output.display().to_string());

        for obj in &input.objects {
            cmd = cmd.arg(obj.display().to_string());
        }

        for dir in &input.lib_dirs {
            cmd = cmd.arg(format!("-L{}", dir.display()));
        }

        // Libraries come after objects so the linker resolves their symbols
        for lib in &input.libs {
            cmd = cmd.arg(format!("-l{}", lib));
        }

        cmd = cmd.args(input.ldflags.iter().cloned());

        cmd
    }

    fn object_extension(&self) -> &str {
        "o"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gcc() -> GccToolchain {
        GccToolchain::new(PathBuf::from("/usr/bin/gcc"), ToolchainPlatform::Gcc)
    }

    #[test]
    fn test_compile_command() {
        let input = CompileInput {
            source: PathBuf::from("build/temp/flint/pyflint.c"),
            output: PathBuf::from("build/temp/flint/pyflint.o"),
            include_dirs: vec![PathBuf::from("/usr/include"), PathBuf::from("src")],
            defines: vec![("NDEBUG".to_string(), None)],
            cflags: vec!["-O2".to_string()],
        };

        let cmd = gcc().compile_command(&input);
        assert_eq!(cmd.program, PathBuf::from("/usr/bin/gcc"));
        assert_eq!(
            cmd.args,
            vec![
                "-c",
                "-fPIC",
                "-I/usr/include",
                "-Isrc",
                "-DNDEBUG",
                "-O2",
                "build/temp/flint/pyflint.c",
                "-o",
                "build/temp/flint/pyflint.o",
            ]
        );
    }

    #[test]
    fn test_link_module_command_orders_libraries_after_objects() {
        let input = LinkInput {
            objects: vec![PathBuf::from("pyflint.o")],
            output: PathBuf::from("build/lib/flint.so"),
            lib_dirs: vec![PathBuf::from("/usr/local/lib")],
            libs: vec!["flint".to_string(), "arb".to_string()],
            ldflags: vec![],
        };

        let cmd = gcc().link_module_command(&input);
        assert_eq!(
            cmd.args,
            vec![
                "-shared",
                "-o",
                "build/lib/flint.so",
                "pyflint.o",
                "-L/usr/local/lib",
                "-lflint",
                "-larb",
            ]
        );
    }

    #[test]
    fn test_apple_clang_links_bundle() {
        let tc = GccToolchain::new(PathBuf::from("clang"), ToolchainPlatform::AppleClang);
        let input = LinkInput {
            objects: vec![PathBuf::from("pyflint.o")],
            output: PathBuf::from("flint.so"),
            lib_dirs: vec![],
            libs: vec![],
            ldflags: vec![],
        };
        let cmd = tc.link_module_command(&input);
        assert_eq!(&cmd.args[..3], &["-bundle", "-undefined", "dynamic_lookup"]);
    }
}
