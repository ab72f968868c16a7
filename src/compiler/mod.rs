//! 编译模块：将规范化后的规则编译为可执行的正则模式
pub mod pattern;
pub mod compiler;
pub mod regex_fixer;

pub use self::pattern::{KeyedPattern, Matcher, Pattern, PatternWarning, PARAM_SEPARATOR, VERSION_PARAM};
pub use self::compiler::RuleCompiler;
pub use self::regex_fixer::RegexFixer;
