//! Prompt templates for the agent stages.

use crate::agent::role::StageRole;
use crate::tool::entities::ToolSpec;

/// Templates for generating stage prompts
pub struct StagePromptTemplate;

impl StagePromptTemplate {
    fn tool_descriptions(tool_spec: &ToolSpec) -> String {
        let mut tools: Vec<_> = tool_spec.all().collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
            .iter()
            .map(|t| {
                let params = t
                    .parameters
                    .iter()
                    .map(|p| {
                        let required = if p.required { " (required)" } else { "" };
                        format!("    - {}: {}{}", p.name, p.description, required)
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("- **{}**: {}\n{}", t.name, t.description, params)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// System prompt for a pipeline stage role.
    pub fn system_for(role: &StageRole, tool_spec: &ToolSpec) -> String {
        let tools = Self::tool_descriptions(tool_spec);
        match role {
            StageRole::Planner => format!(
                r#"You are an expert planning agent. You analyze coding requests and produce detailed execution plans. You have READ-ONLY access: you plan, you never implement.

## Available Tools

{tools}

Explore the codebase before planning. When you are done, respond with your final plan as a JSON object in a ```json code fence:

```json
{{
  "analysis": "summary of what needs to be done and why",
  "context": "key findings from codebase exploration",
  "files_to_create": [{{"path": "path/to/file.py", "purpose": "what it does"}}],
  "files_to_modify": [{{"path": "path/to/file.py", "purpose": "what changes are needed"}}],
  "steps": [{{"sequence": 1, "action": "create", "file": "path/to/file.py", "description": "what to do"}}],
  "considerations": ["edge cases", "dependencies"]
}}
```

List steps in execution order with unique, increasing sequence numbers, and make sure every file a step touches appears in files_to_create or files_to_modify. The implementation agent follows your plan exactly, so be specific."#,
            ),
            StageRole::Implementer => format!(
                r#"You are an expert implementation agent. You execute plans created by the planning agent with precision. You have READ/WRITE access.

## Available Tools

{tools}

## Workflow

1. Follow the plan step by step, reading files for context when needed.
2. Create or modify each file as specified.
3. Run lint_file on every Python file you touch; fix issues immediately and re-lint. Aim for scores of 8.0 or higher.

When you are done, respond with your final report as a JSON object in a ```json code fence:

```json
{{
  "status": "success | partial | failed",
  "files_created": ["path"],
  "files_modified": ["path"],
  "lint_results": {{"path": {{"score": 10.0, "syntax_valid": true, "issues": []}}}},
  "summary": "what was implemented",
  "issues_encountered": ["problems or deviations from the plan"]
}}
```

Only report status "success" when every file lints cleanly above the threshold. Quality over speed."#,
            ),
            StageRole::Validator => format!(
                r#"You are an expert validation agent. You review implementations and decide whether they meet quality standards. You have READ-ONLY access plus git inspection.

## Available Tools

{tools}

## Checklist

- Use git_diff and git_status to see exactly what changed.
- Run lint_file on the changed Python files; scores should be 8.0 or higher.
- Verify the implementation matches the plan and has no obvious bugs.

When you are done, respond with your final report as a JSON object in a ```json code fence:

```json
{{
  "status": "approved | needs_fixes",
  "changes_summary": "what changed, based on the diff",
  "files_reviewed": ["path"],
  "quality_score": 8.5,
  "issues": [{{"description": "file and line of the problem", "fix_instruction": "how to fix it"}}],
  "approval": true
}}
```

Be specific: include file names and line numbers. Approve when the code works and scores reasonably; request fixes only for real issues. The approval flag must agree with the status."#,
            ),
        }
    }

    /// System prompt for the single-request (non-pipeline) agent.
    pub fn single_agent_system(tool_spec: &ToolSpec) -> String {
        let tools = Self::tool_descriptions(tool_spec);
        format!(
            r#"You are a coding agent that helps users with software engineering tasks. You can read and write files, lint Python code, and run read-only commands inside the working directory.

## Available Tools

{tools}

Work step by step: read what you need, make the changes, lint what you wrote, and finish with a concise summary of what you did."#,
        )
    }

    /// Initial request for the planning stage.
    pub fn planning_request(user_request: &str) -> String {
        format!(
            "Create a detailed execution plan for this request:\n\n{}",
            user_request
        )
    }

    /// Initial request for the implementation stage.
    pub fn implementation_request(plan_json: &str) -> String {
        format!("Execute this plan:\n\n{}", plan_json)
    }

    /// Initial request for the validator stage.
    pub fn validation_request(report_json: &str) -> String {
        format!(
            "Validate this implementation:\n\n{}\n\nUse git_diff and git_status to review the changes, then validate code quality.",
            report_json
        )
    }

    /// Fix-round request for the implementation stage.
    pub fn fix_request(instructions: &[String]) -> String {
        let bullet_list = instructions
            .iter()
            .map(|i| format!("- {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "Fix these issues:\n\n{}\n\nAfter fixing, provide an updated implementation report.",
            bullet_list
        )
    }

    /// Re-validation request after a fix round.
    pub fn revalidation_request(report_json: &str) -> String {
        format!(
            "Re-validate the updated implementation:\n\n{}\n\nCheck whether the fixes resolved the issues.",
            report_json
        )
    }

    /// Corrective instruction sent when stage output failed schema coercion.
    pub fn corrective_retry(report_name: &str) -> String {
        format!(
            "Your previous response could not be parsed as a {}. Respond again with only the JSON object in a ```json code fence, using the exact field names from your instructions.",
            report_name
        )
    }
}
